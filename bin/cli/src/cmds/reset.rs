use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Replace the site content with a placeholder and forget its instructions")]
pub struct ResetCommand {
    #[arg(long, short, help = "Name of the site")]
    pub site: String,
}
