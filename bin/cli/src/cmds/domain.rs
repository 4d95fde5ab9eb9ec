use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Attach a custom domain and make it the primary domain")]
pub struct DomainCommand {
    #[arg(long, short, help = "Name of the site")]
    pub site: String,

    #[arg(help = "Domain such as example.com")]
    pub domain: String,
}
