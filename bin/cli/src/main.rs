use std::env;

use anyhow::Result;
use clap::Parser;
use sitesmith_cli::cmd::{approve, check, deploy, domain, prompt, reset, status};
use sitesmith_cli::settings::Config;
use tracing::{debug, error};

use crate::cmds::{Command, Opt};
use crate::output::print_output;

mod cmds;
mod output;

#[tokio::main]
async fn main() {
    let opt = Opt::parse();

    let tracing_level = if opt.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // diagnostics go to stderr so stdout only carries command output
    tracing_subscriber::fmt::fmt()
        .with_max_level(tracing_level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(opt).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(opt: Opt) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::load(opt.config.as_deref(), &cwd)?;
    debug!(path = ?config.path, "using settings");

    let service = config.settings.build_service()?;
    let output = opt.output.unwrap_or_default();

    match opt.cmd {
        Command::Approve(cmd) => {
            print_output(output, approve::invoke(&service, &cmd.site, !cmd.reject).await?)
        }
        Command::Check(cmd) => print_output(output, check::invoke(&service, &cmd.site).await?),
        Command::Deploy(cmd) => {
            print_output(output, deploy::invoke(&service, &cmd.site, cmd.cwd).await?)
        }
        Command::Domain(cmd) => print_output(
            output,
            domain::invoke(&service, &cmd.site, &cmd.domain).await?,
        ),
        Command::Prompt(cmd) => print_output(
            output,
            prompt::invoke(&service, &cmd.site, &cmd.instruction).await?,
        ),
        Command::Reset(cmd) => print_output(output, reset::invoke(&service, &cmd.site).await?),
        Command::Sites(_) => print_output(output, status::list(&service).await?),
        Command::Status(cmd) => print_output(output, status::status(&service, &cmd.site).await?),
    }
}
