use std::fmt;

use serde::Serialize;
use sites::{Approval, SiteService};

use crate::CliResult;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ApprovalView(pub Approval);

impl fmt::Display for ApprovalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Approval::Approved { deploy_url, state } => {
                write!(f, "site is live at {deploy_url} ({state})")
            }
            Approval::Continue => write!(f, "site left as a preview, keep editing"),
        }
    }
}

pub async fn invoke(service: &SiteService, name: &str, approve: bool) -> CliResult<ApprovalView> {
    Ok(ApprovalView(service.approve(name, approve).await?))
}
