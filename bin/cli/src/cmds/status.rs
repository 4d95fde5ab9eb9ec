use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "List every site created locally")]
pub struct SitesCommand {}

#[derive(Parser, Debug)]
#[command(about = "Show the URL and instruction count of a site")]
pub struct StatusCommand {
    #[arg(help = "Name of the site")]
    pub site: String,
}
