use sites::SiteService;

use crate::cmd::Deployed;
use crate::CliResult;

pub async fn invoke(service: &SiteService, name: &str, instruction: &str) -> CliResult<Deployed> {
    let site = service.submit_instruction(name, instruction).await?;
    Ok(site.into())
}
