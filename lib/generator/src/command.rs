use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sitesmith_std::command::run_program_with_args;
use tracing::debug;

use crate::extract::extract_html;
use crate::prompt::combine_instructions;
use crate::{ContentGenerator, GeneratorError, GeneratorResult};

/// Generates by running a local model binary such as `llama-cli`:
/// `<program> -m <model> -p <prompt> -n <max tokens>`.
pub struct CommandGenerator {
    program: String,
    model_path: PathBuf,
    max_tokens: u32,
}

impl CommandGenerator {
    pub fn new(program: &str, model_path: &Path, max_tokens: u32) -> Self {
        Self {
            program: program.to_string(),
            model_path: model_path.to_path_buf(),
            max_tokens,
        }
    }

    fn args(&self, prompt: String) -> Vec<String> {
        vec![
            "-m".to_string(),
            self.model_path.to_string_lossy().into_owned(),
            "-p".to_string(),
            prompt,
            "-n".to_string(),
            self.max_tokens.to_string(),
        ]
    }
}

#[async_trait]
impl ContentGenerator for CommandGenerator {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn generate(&self, instructions: &[String]) -> GeneratorResult<String> {
        let args = self.args(combine_instructions(instructions)?);
        let program = self.program.clone();

        debug!(program, "running model command");
        let output = tokio::task::spawn_blocking(move || {
            run_program_with_args(&program, &args, None, vec![])
        })
        .await
        .map_err(|e| GeneratorError::Task(e.to_string()))??;

        Ok(extract_html(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments() {
        let generator = CommandGenerator::new("llama-cli", Path::new("model.gguf"), 4096);
        assert_eq!(
            vec!["-m", "model.gguf", "-p", "A blog", "-n", "4096"],
            generator.args("A blog".to_string())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_goes_through_extraction() {
        // echo prints its arguments so the prompt comes back as the model output
        let generator = CommandGenerator::new("echo", Path::new("model.gguf"), 16);
        let html = generator
            .generate(&["<body>hi</body>".to_string()])
            .await
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>\n<html>\n<head>"));
        assert!(html.contains("<body>hi</body>"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_an_error() {
        let generator = CommandGenerator::new("false", Path::new("model.gguf"), 16);
        let result = generator.generate(&["A blog".to_string()]).await;
        assert!(matches!(result, Err(GeneratorError::Command(_))));
    }

    #[tokio::test]
    async fn empty_history_runs_nothing() {
        let generator = CommandGenerator::new("definitely-not-a-real-program", Path::new("m"), 16);
        assert!(matches!(
            generator.generate(&[]).await,
            Err(GeneratorError::NoInstructions)
        ));
    }
}
