use sites::SiteService;

use crate::cmd::Deployed;
use crate::CliResult;

pub async fn invoke(service: &SiteService, name: &str) -> CliResult<Deployed> {
    Ok(service.reset_content(name).await?.into())
}
