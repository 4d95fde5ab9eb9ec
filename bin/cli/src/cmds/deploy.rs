use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Create a new deploy from the contents of a folder")]
pub struct DeployCommand {
    #[arg(long, short, help = "Name of the site")]
    pub site: String,

    #[arg(
        long,
        short,
        help = "The directory to deploy. Defaults to current directory."
    )]
    pub cwd: Option<PathBuf>,
}
