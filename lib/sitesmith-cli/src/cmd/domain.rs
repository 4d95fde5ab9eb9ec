use std::fmt;

use hosting::SiteName;
use serde::Serialize;
use sites::{SiteError, SiteService};

use crate::CliResult;

#[derive(Debug, PartialEq, Serialize)]
pub struct DomainView {
    pub site_name: String,
    pub domain: String,
}

impl fmt::Display for DomainView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is now the primary domain of {}", self.domain, self.site_name)
    }
}

pub async fn invoke(service: &SiteService, name: &str, domain: &str) -> CliResult<DomainView> {
    let domain = service.add_domain(name, domain).await?;
    let site_name = SiteName::parse(name).map_err(SiteError::from)?;
    Ok(DomainView {
        site_name: site_name.to_string(),
        domain: domain.to_string(),
    })
}
