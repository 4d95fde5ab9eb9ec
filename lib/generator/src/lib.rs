//! Turns an instruction history into an HTML document.
//!
//! [`ChatCompletionGenerator`] talks to an OpenAI compatible completion server such as
//! `llama-server`, [`CommandGenerator`] runs a local model binary, and [`FallbackGenerator`]
//! tries one and then the other.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitesmith_std::error::SitesmithStdError;
use thiserror::Error;

pub mod chat;
pub mod command;
pub mod extract;
pub mod fallback;
pub mod prompt;

pub use chat::ChatCompletionGenerator;
pub use command::CommandGenerator;
pub use extract::extract_html;
pub use fallback::FallbackGenerator;

#[remain::sorted]
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("model command failed: {0}")]
    Command(#[from] SitesmithStdError),

    #[error("unable to decode completion response: {0}")]
    Decode(String),

    #[error("completion response contained no content")]
    EmptyResponse,

    #[error("completion server returned an error. Code: {status}, message: {body}")]
    Http { status: u16, body: String },

    #[error("at least one instruction is required")]
    NoInstructions,

    #[error("no generator configured. Set a completion endpoint or a model command")]
    NotConfigured,

    #[error("generation task failed: {0}")]
    Task(String),

    #[error("completion request timed out")]
    Timeout,

    #[error("completion transport error: {0}")]
    Transport(String),
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn generate(&self, instructions: &[String]) -> GeneratorResult<String>;
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Base URL of the completion server, e.g. `http://127.0.0.1:8080`.
    pub endpoint: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub command: Option<CommandSettings>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: Some("http://127.0.0.1:8080".to_string()),
            model: "local".to_string(),
            timeout_secs: 300,
            command: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CommandSettings {
    pub program: String,
    pub model_path: PathBuf,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    4096
}

impl GeneratorSettings {
    /// Builds the configured generator. With both an endpoint and a command the command is used
    /// when the completion server fails.
    pub fn build(&self) -> GeneratorResult<Arc<dyn ContentGenerator>> {
        let chat = match &self.endpoint {
            Some(endpoint) => Some(Arc::new(ChatCompletionGenerator::new(
                endpoint,
                &self.model,
                Duration::from_secs(self.timeout_secs),
            )?) as Arc<dyn ContentGenerator>),
            None => None,
        };

        let command = self.command.as_ref().map(|c| {
            Arc::new(CommandGenerator::new(&c.program, &c.model_path, c.max_tokens))
                as Arc<dyn ContentGenerator>
        });

        match (chat, command) {
            (Some(primary), Some(fallback)) => {
                Ok(Arc::new(FallbackGenerator::new(primary, fallback)))
            }
            (Some(generator), None) | (None, Some(generator)) => Ok(generator),
            (None, None) => Err(GeneratorError::NotConfigured),
        }
    }
}
