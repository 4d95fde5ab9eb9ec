use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::extract::extract_html;
use crate::prompt::{combine_instructions, with_document_requirements};
use crate::{ContentGenerator, GeneratorError, GeneratorResult};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
    repeat_penalty: f64,
    top_k: u32,
    top_p: f64,
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl From<reqwest::Error> for GeneratorError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GeneratorError::Timeout
        } else {
            GeneratorError::Transport(error.to_string())
        }
    }
}

/// Generates through an OpenAI compatible `/v1/chat/completions` endpoint.
pub struct ChatCompletionGenerator {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl ChatCompletionGenerator {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> GeneratorResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: format!("{}{COMPLETIONS_PATH}", endpoint.trim_end_matches('/')),
            model: model.to_string(),
            client,
        })
    }
}

#[async_trait]
impl ContentGenerator for ChatCompletionGenerator {
    fn name(&self) -> &'static str {
        "chat-completion"
    }

    async fn generate(&self, instructions: &[String]) -> GeneratorResult<String> {
        let prompt = with_document_requirements(&combine_instructions(instructions)?);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: 0.7,
            max_tokens: 4000,
            repeat_penalty: 1.1,
            top_k: 40,
            top_p: 0.95,
        };

        debug!(url = self.url, instructions = instructions.len(), "requesting completion");
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request).map_err(|e| GeneratorError::Decode(e.to_string()))?)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            error!(status = status.as_u16(), body, "completion request failed");
            return Err(GeneratorError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse =
            serde_json::from_slice(&body).map_err(|e| GeneratorError::Decode(e.to_string()))?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GeneratorError::EmptyResponse)?;

        Ok(extract_html(&content))
    }
}
