use std::fmt;

use serde::Serialize;
use sites::{NameCheck, SiteService};

use crate::CliResult;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct NameCheckView(pub NameCheck);

impl fmt::Display for NameCheckView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.message)?;
        if let Some(site_id) = &self.0.site_id {
            write!(f, "\nsite id: {site_id}")?;
        }
        if let Some(url) = &self.0.deploy_url {
            write!(f, "\nurl: {url}")?;
        }
        if let Some(prompts) = &self.0.prompts {
            for (i, prompt) in prompts.iter().enumerate() {
                write!(f, "\n{}. {prompt}", i + 1)?;
            }
        }
        Ok(())
    }
}

pub async fn invoke(service: &SiteService, name: &str) -> CliResult<NameCheckView> {
    Ok(NameCheckView(service.check_name(name).await?))
}
