use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::{ContentGenerator, GeneratorError, GeneratorResult};

/// Uses `primary` and, when it fails, `fallback`.
pub struct FallbackGenerator {
    primary: Arc<dyn ContentGenerator>,
    fallback: Arc<dyn ContentGenerator>,
}

impl FallbackGenerator {
    pub fn new(primary: Arc<dyn ContentGenerator>, fallback: Arc<dyn ContentGenerator>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl ContentGenerator for FallbackGenerator {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn generate(&self, instructions: &[String]) -> GeneratorResult<String> {
        if instructions.is_empty() {
            return Err(GeneratorError::NoInstructions);
        }

        match self.primary.generate(instructions).await {
            Ok(html) => Ok(html),
            Err(e) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "generator failed, using fallback"
                );
                self.fallback.generate(instructions).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing_test::traced_test;

    use super::*;

    struct Fixed {
        name: &'static str,
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ContentGenerator for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn generate(&self, _instructions: &[String]) -> GeneratorResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(str::to_string)
                .ok_or(GeneratorError::Timeout)
        }
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let primary = Fixed::new("primary", Some("<p>primary</p>"));
        let fallback = Fixed::new("fallback", Some("<p>fallback</p>"));
        let generator = FallbackGenerator::new(primary.clone(), fallback.clone());

        let html = generator.generate(&["A blog".to_string()]).await.unwrap();

        assert_eq!("<p>primary</p>", html);
        assert_eq!(0, fallback.calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    #[traced_test]
    async fn primary_failure_uses_fallback() {
        let primary = Fixed::new("primary", None);
        let fallback = Fixed::new("fallback", Some("<p>fallback</p>"));
        let generator = FallbackGenerator::new(primary.clone(), fallback.clone());

        let html = generator.generate(&["A blog".to_string()]).await.unwrap();

        assert_eq!("<p>fallback</p>", html);
        assert_eq!(1, primary.calls.load(Ordering::SeqCst));
        assert_eq!(1, fallback.calls.load(Ordering::SeqCst));
        assert!(logs_contain("generator failed, using fallback"));
    }

    #[tokio::test]
    async fn both_failing_reports_fallback_error() {
        let generator = FallbackGenerator::new(Fixed::new("a", None), Fixed::new("b", None));
        assert!(matches!(
            generator.generate(&["A blog".to_string()]).await,
            Err(GeneratorError::Timeout)
        ));
    }

    #[tokio::test]
    async fn empty_history_calls_neither() {
        let primary = Fixed::new("primary", Some("x"));
        let generator = FallbackGenerator::new(primary.clone(), Fixed::new("fallback", Some("y")));

        assert!(matches!(
            generator.generate(&[]).await,
            Err(GeneratorError::NoInstructions)
        ));
        assert_eq!(0, primary.calls.load(Ordering::SeqCst));
    }
}
