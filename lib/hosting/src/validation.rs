use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

// hosting subdomains are a single DNS label
const MAX_SITE_NAME_LEN: usize = 63;
const MAX_HOSTNAME_LEN: usize = 253;

lazy_static! {
    static ref SITE_NAME: Regex = Regex::new(r"^[a-z0-9-]+$").expect("valid site name regex");
    static ref HOSTNAME: Regex =
        Regex::new(r"^([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}$").expect("valid hostname regex");
}

#[remain::sorted]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("site name is required")]
    EmptySiteName,

    #[error("invalid domain `{0}`. Expected a lowercase hostname such as example.com")]
    InvalidDomain(String),

    #[error(
        "invalid site name `{0}`. Site names may only contain letters, digits and hyphens (-)"
    )]
    InvalidSiteName(String),
}

/// A validated site name. Names are case-insensitive so they are stored lowercase.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SiteName(String);

impl SiteName {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return Err(ValidationError::EmptySiteName);
        }

        if name.len() > MAX_SITE_NAME_LEN || !SITE_NAME.is_match(&name) {
            return Err(ValidationError::InvalidSiteName(raw.trim().to_string()));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SiteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A hostname that passed the strict custom domain check. No normalization is applied, an
/// uppercase hostname is rejected rather than lowercased.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Domain(String);

impl Domain {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.len() > MAX_HOSTNAME_LEN || !HOSTNAME.is_match(raw) {
            return Err(ValidationError::InvalidDomain(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
