use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use sites::Settings;

pub const DEFAULT_CONFIG_FILE: &str = "sitesmith.toml";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Configuration {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(flatten)]
    pub sites: Settings,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Generating a page can take minutes on a local model.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            request_timeout_secs: 600,
        }
    }
}

/// Defaults, then the TOML file, then `SITESMITH_` variables with `__` separating nested keys.
/// `NETLIFY_AUTH_TOKEN` is honored for the hosting token.
pub fn get_configuration(path: Option<&Path>) -> Result<Configuration, figment::Error> {
    let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

    Figment::from(Serialized::defaults(Configuration::default()))
        .merge(Toml::file(path))
        .merge(
            Env::raw()
                .only(&["NETLIFY_AUTH_TOKEN"])
                .map(|_| "hosting.token".into()),
        )
        .merge(Env::prefixed("SITESMITH_").split("__"))
        .extract()
}
