//! The site workflow: name checks, instruction driven generation, previews, approval, custom
//! domains and content resets. Both the HTTP server and the CLI are thin layers over
//! [`SiteService`].

use cas::CasError;
use generator::GeneratorError;
use hosting::{HostingError, ValidationError};
use thiserror::Error;

pub mod service;
pub mod settings;
pub mod store;

pub use service::{Approval, NameCheck, PublishedSite, SiteService, SiteStatus};
pub use settings::Settings;
pub use store::{SiteRecord, SiteStore, StoreError};

#[remain::sorted]
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("instruction must not be empty")]
    EmptyInstruction,

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Hosting(#[from] HostingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to scan site directory: {0}")]
    Scan(#[from] CasError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("no site named {0} has been created yet")]
    UnknownSite(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type SiteResult<T> = Result<T, SiteError>;
