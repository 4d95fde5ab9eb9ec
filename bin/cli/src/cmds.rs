use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cmds::approve::ApproveCommand;
use crate::cmds::check::CheckCommand;
use crate::cmds::deploy::DeployCommand;
use crate::cmds::domain::DomainCommand;
use crate::cmds::prompt::PromptCommand;
use crate::cmds::reset::ResetCommand;
use crate::cmds::status::{SitesCommand, StatusCommand};
use crate::output::{parse_output, Output};

pub mod approve;
pub mod check;
pub mod deploy;
pub mod domain;
pub mod prompt;
pub mod reset;
pub mod status;

#[derive(Debug, Parser)]
#[command(name = "sitesmith", about = "Build websites from instructions and publish them")]
pub struct Opt {
    #[arg(
        long,
        help = "Prints a verbose output during the program execution",
        global = true
    )]
    pub debug: bool,

    #[arg(
        long,
        short,
        value_parser = parse_output,
        help = "How a command output should be rendered (json or text)",
        global = true
    )]
    pub output: Option<Output>,

    #[arg(
        long,
        help = "Settings file. Defaults to sitesmith.toml in the current directory",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Approve(ApproveCommand),
    Check(CheckCommand),
    Deploy(DeployCommand),
    Domain(DomainCommand),
    Prompt(PromptCommand),
    Reset(ResetCommand),
    Sites(SitesCommand),
    Status(StatusCommand),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Opt::command().debug_assert();
    }

    #[test]
    fn prompt_args() {
        let opt = Opt::try_parse_from([
            "sitesmith",
            "--output",
            "text",
            "prompt",
            "--site",
            "demo-site",
            "A landing page",
        ])
        .unwrap();

        assert!(matches!(opt.output, Some(Output::Text)));
        match opt.cmd {
            Command::Prompt(cmd) => {
                assert_eq!("demo-site", cmd.site);
                assert_eq!("A landing page", cmd.instruction);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn approve_defaults_to_approving() {
        let opt = Opt::try_parse_from(["sitesmith", "approve", "--site", "demo-site"]).unwrap();
        match opt.cmd {
            Command::Approve(cmd) => assert!(!cmd.reject),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_output_is_rejected() {
        let result = Opt::try_parse_from(["sitesmith", "--output", "yaml", "sites"]);
        assert!(result.is_err());
    }
}
