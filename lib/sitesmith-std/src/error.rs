use thiserror::Error;

#[remain::sorted]
#[derive(Debug, Error)]
pub enum SitesmithStdError {
    /// A program ran but exited unsuccessfully.
    #[error("`{program}` exited with {status}")]
    CommandFailed { program: String, status: String },

    /// Error that may occur while I/O operations.
    #[error("IO error: `{0}`")]
    IoError(#[from] std::io::Error),
}

pub type SitesmithStdResult<T> = Result<T, SitesmithStdError>;
