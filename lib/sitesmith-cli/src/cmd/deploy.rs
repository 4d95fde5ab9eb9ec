use std::env;
use std::path::PathBuf;

use sites::SiteService;
use tracing::info;

use crate::cmd::Deployed;
use crate::CliResult;

/// Deploys `dir`, or the current directory, as the content of `name`.
pub async fn invoke(
    service: &SiteService,
    name: &str,
    dir: Option<PathBuf>,
) -> CliResult<Deployed> {
    let dir = match dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    info!(dir = %dir.display(), name, "deploying directory");
    Ok(service.deploy_directory(name, &dir).await?.into())
}
