use std::fmt;

use serde::Serialize;
use sites::PublishedSite;

pub mod approve;
pub mod check;
pub mod deploy;
pub mod domain;
pub mod prompt;
pub mod reset;
pub mod status;

/// What a command that deployed content reports back.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Deployed {
    pub name: String,
    pub site_id: String,
    pub deploy_url: String,
    pub uploaded: Vec<String>,
    pub failed: Vec<String>,
}

impl From<PublishedSite> for Deployed {
    fn from(site: PublishedSite) -> Self {
        Self {
            name: site.name,
            site_id: site.site_id,
            deploy_url: site.deploy_url,
            uploaded: site.deploy.uploaded,
            failed: site.deploy.failed,
        }
    }
}

impl fmt::Display for Deployed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} deployed to {} ({} file(s) uploaded)",
            self.name,
            self.deploy_url,
            self.uploaded.len()
        )?;
        for path in &self.failed {
            write!(f, "\nfailed to upload {path}")?;
        }
        Ok(())
    }
}
