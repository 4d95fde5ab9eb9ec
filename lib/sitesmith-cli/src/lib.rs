pub mod cmd;
pub mod enums;
pub mod settings;

use thiserror::Error;

use crate::enums::EnumError;

#[remain::sorted]
#[derive(Error, Debug)]
pub enum SitesmithCliError {
    #[error(transparent)]
    EnumError(#[from] EnumError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json serialize/deserialize error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    SiteError(#[from] sites::SiteError),

    /// Errors that may occur when deserializing settings from TOML format.
    #[error("invalid settings file {path}: {source}")]
    TomlDeserialize {
        path: std::path::PathBuf,
        source: toml::de::Error,
    },
}

pub type CliResult<T> = Result<T, SitesmithCliError>;
