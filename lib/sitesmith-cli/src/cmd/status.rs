use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sites::{SiteRecord, SiteService, SiteStatus};

use crate::CliResult;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct SiteList(pub BTreeMap<String, SiteRecord>);

impl fmt::Display for SiteList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no sites yet");
        }

        let lines: Vec<String> = self
            .0
            .iter()
            .map(|(name, record)| {
                format!(
                    "{name}\t{}\t{} instruction(s)",
                    record.deploy_url,
                    record.prompts.len()
                )
            })
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct StatusView(pub SiteStatus);

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{} instruction(s)",
            self.0.site_name, self.0.deploy_url, self.0.prompts_count
        )
    }
}

pub async fn list(service: &SiteService) -> CliResult<SiteList> {
    Ok(SiteList(service.list_sites().await?))
}

pub async fn status(service: &SiteService, name: &str) -> CliResult<StatusView> {
    Ok(StatusView(service.status(name).await?))
}
