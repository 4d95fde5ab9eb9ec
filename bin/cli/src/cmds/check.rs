use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Check whether a site name is already in use")]
pub struct CheckCommand {
    #[arg(help = "Name of the site")]
    pub site: String,
}
