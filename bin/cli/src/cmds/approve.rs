use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Publish a site to production once its preview looks right")]
pub struct ApproveCommand {
    #[arg(long, short, help = "Name of the site")]
    pub site: String,

    #[arg(long, help = "Keep the site as a preview instead of publishing it")]
    pub reject: bool,
}
