use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use sites::Settings;
use sitesmith_std::env::non_empty;
use tracing::debug;

use crate::{CliResult, SitesmithCliError};

pub const DEFAULT_CONFIG_NAME: &str = "sitesmith.toml";

pub const SITESMITH_ENV_SETTINGS_PATH: &str = "SITESMITH_CONFIG_PATH";

pub const HOSTING_TOKEN_ENV: &str = "NETLIFY_AUTH_TOKEN";

/// Settings together with the file they were read from, if any.
#[derive(Clone, Debug)]
pub struct Config {
    pub path: Option<PathBuf>,
    pub settings: Settings,
}

impl Config {
    /// Loads settings from the first of: `explicit`, `SITESMITH_CONFIG_PATH`,
    /// `<cwd>/sitesmith.toml`, the global config directory. Falls back to defaults when none
    /// exist. `NETLIFY_AUTH_TOKEN` overrides the token from any file.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> CliResult<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => non_empty(SITESMITH_ENV_SETTINGS_PATH)
                .map(PathBuf::from)
                .or_else(|| Some(get_settings_file(cwd)).filter(|p| p.is_file()))
                .or_else(|| get_global_settings_file().filter(|p| p.is_file())),
        };

        let mut settings = match &path {
            Some(path) => get_settings(path)?,
            None => Settings::default(),
        };
        debug!(path = ?path, "settings loaded");

        if let Some(token) = non_empty(HOSTING_TOKEN_ENV) {
            settings.hosting.token = Some(token);
        }

        Ok(Self { path, settings })
    }
}

pub(crate) fn get_settings_file(cwd: &Path) -> PathBuf {
    cwd.join(DEFAULT_CONFIG_NAME)
}

pub(crate) fn get_settings(path: &Path) -> CliResult<Settings> {
    let contents = fs::read_to_string(path)?;
    toml::from_str(contents.as_str()).map_err(|source| SitesmithCliError::TomlDeserialize {
        path: path.to_path_buf(),
        source,
    })
}

pub fn get_global_settings_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "sitesmith", "cli").map(|dirs| dirs.config_dir().to_path_buf())
}

pub(crate) fn get_global_settings_file() -> Option<PathBuf> {
    get_global_settings_dir().map(|dir| dir.join(DEFAULT_CONFIG_NAME))
}
