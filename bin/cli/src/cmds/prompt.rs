use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Generate the site from its instructions plus a new one and deploy a preview")]
pub struct PromptCommand {
    #[arg(long, short, help = "Name of the site")]
    pub site: String,

    #[arg(help = "What to build or change")]
    pub instruction: String,
}
