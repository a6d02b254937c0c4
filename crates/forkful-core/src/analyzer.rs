//! The analysis entry point: one image + one template → one provider call.
//!
//! `FoodAnalyzer` owns the provider for the lifetime of the process and wraps
//! every call in the configured retry policy. Input checks (pixel ceiling,
//! empty question) run before the provider is touched.

use crate::config::{AnalysisConfig, Config, LimitsConfig};
use crate::error::{AnalysisResult, ProviderError};
use crate::input::check_pixel_ceiling;
use crate::llm::{LlmProvider, LlmResponse, RetryPolicy};
use crate::prompts::AnalysisKind;
use crate::types::{Analysis, FoodImage, FoodVerdict};
use std::sync::Arc;
use std::time::Duration;

/// Runs analyses against a single provider.
pub struct FoodAnalyzer {
    provider: Arc<dyn LlmProvider>,
    retry: RetryPolicy,
    limits: LimitsConfig,
    analysis: AnalysisConfig,
}

impl FoodAnalyzer {
    /// Create an analyzer using the retry policy and limits from `config`.
    pub fn new(provider: Box<dyn LlmProvider>, config: &Config) -> Self {
        Self {
            provider: Arc::from(provider),
            retry: RetryPolicy::from_config(&config.retry),
            limits: config.limits.clone(),
            analysis: config.analysis.clone(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Whether the provider is configured and reachable. Makes no analysis call.
    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Whether the analyzer runs the food check before analysing a new image.
    pub fn validates_food(&self) -> bool {
        self.analysis.validate_food
    }

    /// Ask the model whether the image shows food.
    pub async fn validate(&self, image: &FoodImage) -> AnalysisResult<FoodVerdict> {
        let response = self.call(image, AnalysisKind::Validation, None).await?;
        let verdict = FoodVerdict::from_response(&response.text);
        tracing::info!(
            "Food check for {}: {:?} ({:?})",
            image.file_name(),
            verdict,
            response.text
        );
        Ok(verdict)
    }

    /// Run one analysis and return the response record.
    pub async fn analyze(
        &self,
        image: &FoodImage,
        kind: AnalysisKind,
        question: Option<&str>,
    ) -> AnalysisResult<Analysis> {
        let response = self.call(image, kind, question).await?;
        tracing::info!(
            "{} analysis of {} done in {}ms",
            kind,
            image.file_name(),
            response.latency_ms
        );

        Ok(Analysis {
            kind,
            image: image.file_name(),
            question: match kind {
                AnalysisKind::Question => question.map(|q| q.trim().to_string()),
                _ => None,
            },
            text: response.text,
            model: response.model,
            tokens_used: response.tokens_used,
            latency_ms: response.latency_ms,
            created_at: chrono::Utc::now(),
        })
    }

    async fn call(
        &self,
        image: &FoodImage,
        kind: AnalysisKind,
        question: Option<&str>,
    ) -> AnalysisResult<LlmResponse> {
        check_pixel_ceiling(image, self.limits.max_pixels)?;
        let request = kind.build_request(image, question, self.analysis.temperature)?;

        let timeout_ms = self.limits.llm_timeout_ms;
        let provider = self.provider.clone();
        tracing::debug!(
            "Sending {} request to {} ({})",
            kind,
            provider.name(),
            provider.model()
        );

        self.retry
            .run(|attempt| {
                let provider = provider.clone();
                let request = &request;
                async move {
                    tracing::debug!("{kind} attempt {attempt} via {}", provider.name());
                    match tokio::time::timeout(
                        Duration::from_millis(timeout_ms),
                        provider.generate(request),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::Unavailable {
                            provider: provider.name().to_string(),
                            message: format!("Timeout after {timeout_ms}ms"),
                        }),
                    }
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::llm::{Backoff, LlmRequest};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// A configurable mock provider.
    ///
    /// Each call to `generate()` invokes the response factory with the current
    /// call index and records the request it was given.
    struct MockProvider {
        response_fn: Box<dyn Fn(u32) -> Result<String, ProviderError> + Send + Sync>,
        call_count: Arc<AtomicU32>,
        requests: Arc<Mutex<Vec<LlmRequest>>>,
        delay: Option<Duration>,
        available: bool,
    }

    impl MockProvider {
        fn replying(text: &str) -> Self {
            let text = text.to_string();
            Self::with_fn(move |_| Ok(text.clone()))
        }

        fn with_fn(
            f: impl Fn(u32) -> Result<String, ProviderError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                response_fn: Box::new(f),
                call_count: Arc::new(AtomicU32::new(0)),
                requests: Arc::new(Mutex::new(Vec::new())),
                delay: None,
                available: true,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-vlm"
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response_fn)(idx).map(|text| LlmResponse {
                text,
                model: "mock-vlm".to_string(),
                tokens_used: Some(12),
                latency_ms: 5,
            })
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(60)
        }
    }

    fn image(width: u32, height: u32) -> FoodImage {
        FoodImage {
            path: PathBuf::from("/tmp/pancakes.jpg"),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            format: "jpeg".to_string(),
            width,
            height,
        }
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Backoff::Fixed(Duration::from_millis(1)),
            ..RetryPolicy::default()
        }
    }

    /// Build an analyzer around `provider`, returning handles to its counters.
    fn analyzer(
        provider: MockProvider,
        config: Config,
    ) -> (FoodAnalyzer, Arc<AtomicU32>, Arc<Mutex<Vec<LlmRequest>>>) {
        let calls = provider.call_count.clone();
        let requests = provider.requests.clone();
        let analyzer = FoodAnalyzer::new(Box::new(provider), &config).with_retry(fast_retry(3));
        (analyzer, calls, requests)
    }

    #[tokio::test]
    async fn test_availability_check_makes_no_call() {
        let mut provider = MockProvider::replying("VALID_FOOD");
        provider.available = false;
        let (analyzer, calls, _) = analyzer(provider, Config::default());
        assert!(!analyzer.is_available().await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validate_food() {
        let (analyzer, calls, requests) =
            analyzer(MockProvider::replying("VALID_FOOD"), Config::default());
        let verdict = analyzer.validate(&image(640, 480)).await.unwrap();
        assert_eq!(verdict, FoodVerdict::Food);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].max_tokens, 10);
        assert_eq!(requests[0].temperature, 0.0);
        assert_eq!(requests[0].prompt, "Is this image a food item?");
    }

    #[tokio::test]
    async fn test_validate_not_food() {
        for reply in ["NOT_FOOD", "I think this is a cat.", ""] {
            let (analyzer, _, _) = analyzer(MockProvider::replying(reply), Config::default());
            let verdict = analyzer.validate(&image(640, 480)).await.unwrap();
            assert_eq!(verdict, FoodVerdict::NotFood, "reply: {reply:?}");
        }
    }

    #[tokio::test]
    async fn test_every_kind_sends_its_template() {
        for kind in AnalysisKind::ALL {
            let (analyzer, _, requests) =
                analyzer(MockProvider::replying("## Result"), Config::default());
            analyzer
                .analyze(&image(640, 480), kind, Some("Is it vegan?"))
                .await
                .unwrap();
            let requests = requests.lock().unwrap();
            assert!(requests[0].system.contains(kind.template()), "kind: {kind}");
            assert_eq!(requests[0].max_tokens, kind.token_budget());
        }
    }

    #[tokio::test]
    async fn test_analysis_record() {
        let (analyzer, _, requests) =
            analyzer(MockProvider::replying("## Recipe\n1. Mix"), Config::default());
        let analysis = analyzer
            .analyze(&image(640, 480), AnalysisKind::Recipe, None)
            .await
            .unwrap();
        assert_eq!(analysis.kind, AnalysisKind::Recipe);
        assert_eq!(analysis.image, "pancakes.jpg");
        assert_eq!(analysis.text, "## Recipe\n1. Mix");
        assert_eq!(analysis.model, "mock-vlm");
        assert_eq!(analysis.tokens_used, Some(12));
        assert!(analysis.question.is_none());

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].temperature, 0.3);
        assert_eq!(
            requests[0].prompt,
            "Please provide a detailed recipe analysis of this food image."
        );
    }

    #[tokio::test]
    async fn test_oversized_image_makes_no_call() {
        let mut config = Config::default();
        config.limits.max_pixels = 1000;
        let (analyzer, calls, _) = analyzer(MockProvider::replying("VALID_FOOD"), config);

        let err = analyzer
            .analyze(&image(100, 11), AnalysisKind::Ingredients, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ImageTooLarge { .. }));
        assert!(analyzer.validate(&image(100, 11)).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_question_makes_no_call() {
        let (analyzer, calls, _) = analyzer(MockProvider::replying("yes"), Config::default());
        for question in [None, Some(""), Some("   \n")] {
            let err = analyzer
                .analyze(&image(640, 480), AnalysisKind::Question, question)
                .await
                .unwrap_err();
            assert!(matches!(err, AnalysisError::EmptyQuestion));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_question_is_trimmed_and_recorded() {
        let (analyzer, _, requests) =
            analyzer(MockProvider::replying("Mildly."), Config::default());
        let analysis = analyzer
            .analyze(&image(640, 480), AnalysisKind::Question, Some("  How spicy is it? "))
            .await
            .unwrap();
        assert_eq!(analysis.question.as_deref(), Some("How spicy is it?"));
        assert_eq!(requests.lock().unwrap()[0].prompt, "How spicy is it?");
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let provider = MockProvider::with_fn(|idx| {
            if idx < 2 {
                Err(ProviderError::from_status("mock", 503, "overloaded"))
            } else {
                Ok("Flour, eggs, milk".to_string())
            }
        });
        let (analyzer, calls, _) = analyzer(provider, Config::default());
        let analysis = analyzer
            .analyze(&image(640, 480), AnalysisKind::Ingredients, None)
            .await
            .unwrap();
        assert_eq!(analysis.text, "Flour, eggs, milk");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_always_failing_exhausts_attempts() {
        let provider =
            MockProvider::with_fn(|_| Err(ProviderError::from_status("mock", 429, "slow down")));
        let (analyzer, calls, _) = analyzer(provider, Config::default());
        let err = analyzer
            .analyze(&image(640, 480), AnalysisKind::Nutrition, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::RetriesExhausted { attempts: 3, .. }));
        assert!(err.to_string().contains("after 3 attempts"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let provider =
            MockProvider::with_fn(|_| Err(ProviderError::from_status("mock", 401, "bad key")));
        let (analyzer, calls, _) = analyzer(provider, Config::default());
        let err = analyzer
            .analyze(&image(640, 480), AnalysisKind::Recipe, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.provider_error(),
            Some(ProviderError::Unauthenticated { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_unavailable() {
        let mut config = Config::default();
        config.limits.llm_timeout_ms = 20;
        let provider = MockProvider::replying("late").with_delay(Duration::from_millis(500));
        let calls = provider.call_count.clone();
        let analyzer = FoodAnalyzer::new(Box::new(provider), &config).with_retry(fast_retry(2));

        let err = analyzer
            .analyze(&image(640, 480), AnalysisKind::Ingredients, None)
            .await
            .unwrap_err();
        match err {
            AnalysisError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 2);
                assert!(matches!(source, ProviderError::Unavailable { .. }));
                assert!(source.to_string().contains("Timeout after 20ms"));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
