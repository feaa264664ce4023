//! Question-answering orchestrator.
//!
//! Fans a batch of questions out as concurrent retrieve-then-complete
//! pipelines, bounded by a semaphore, and collects the answers in input
//! order. Each question is isolated: one failing question produces a
//! fallback answer in its slot without disturbing its siblings.

use crate::retriever::ContextRetriever;
use hackrx_core::{AppResult, EngineConfig};
use hackrx_llm::{LlmClient, LlmRequest};
use hackrx_prompt::{QaPrompt, NOT_AVAILABLE_PHRASE};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Answer returned when rate-limit retries are exhausted.
pub const BUSY_FALLBACK: &str =
    "The service is handling too many requests right now. Please try again in a moment.";

/// Answer returned when a question fails for any non-throttling reason.
pub const ERROR_FALLBACK: &str = "An error occurred while answering this question.";

/// Retry bookkeeping for one question's pipeline.
///
/// Only throttling is retried; any other failure ends the pipeline on the
/// first occurrence.
#[derive(Debug)]
struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    attempts_made: u32,
}

impl RetryPolicy {
    fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            attempts_made: 0,
        }
    }

    /// Record one failed attempt. Returns the delay to wait before the next
    /// attempt, or `None` when the budget is spent.
    fn backoff(&mut self) -> Option<Duration> {
        self.attempts_made += 1;
        if self.attempts_made < self.max_attempts {
            Some(self.delay)
        } else {
            None
        }
    }
}

/// Tuning knobs for the orchestrator, resolved from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Questions answered concurrently
    pub concurrency: usize,

    /// Chunks retrieved per question
    pub top_k: usize,

    /// Attempts per question when the upstream throttles
    pub max_attempts: u32,

    /// Pause between throttled attempts
    pub retry_delay: Duration,

    /// Completion model identifier
    pub model: String,
}

impl EngineSettings {
    pub fn from_config(config: &EngineConfig, model: impl Into<String>) -> Self {
        Self {
            concurrency: config.concurrency,
            top_k: config.top_k,
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            model: model.into(),
        }
    }
}

/// The question-answering engine.
pub struct QaEngine {
    retriever: Arc<dyn ContextRetriever>,
    llm: Arc<dyn LlmClient>,
    prompt: QaPrompt,
    settings: EngineSettings,
    semaphore: Arc<Semaphore>,
}

impl QaEngine {
    pub fn new(
        retriever: Arc<dyn ContextRetriever>,
        llm: Arc<dyn LlmClient>,
        settings: EngineSettings,
    ) -> AppResult<Self> {
        let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
        Ok(Self {
            retriever,
            llm,
            prompt: QaPrompt::new()?,
            settings,
            semaphore,
        })
    }

    /// Answer a batch of questions.
    ///
    /// The returned vector has one answer per question, in the same order as
    /// the input. This never fails: a question whose pipeline errors gets a
    /// fallback string in its slot.
    pub async fn answer_all(&self, questions: &[String]) -> Vec<String> {
        tracing::info!("Answering batch of {} questions", questions.len());

        let futures = questions
            .iter()
            .enumerate()
            .map(|(index, question)| self.answer_gated(index, question));

        futures::future::join_all(futures).await
    }

    /// Answer one question once a concurrency permit is available.
    async fn answer_gated(&self, index: usize, question: &str) -> String {
        let permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                // Only possible if the semaphore is closed, which never
                // happens while the engine is alive.
                tracing::error!(index, "Concurrency gate closed");
                return ERROR_FALLBACK.to_string();
            }
        };

        let answer = self.answer_with_retry(index, question).await;
        drop(permit);
        answer
    }

    /// Run one question's pipeline with the retry policy applied.
    async fn answer_with_retry(&self, index: usize, question: &str) -> String {
        let mut policy = RetryPolicy::new(self.settings.max_attempts, self.settings.retry_delay);

        loop {
            match self.answer_once(question).await {
                Ok(answer) => return answer,
                Err(error) if error.is_rate_limit() => match policy.backoff() {
                    Some(delay) => {
                        tracing::warn!(
                            index,
                            "Upstream throttled, retrying in {}s: {}",
                            delay.as_secs(),
                            error
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(index, "Retry budget exhausted: {}", error);
                        return BUSY_FALLBACK.to_string();
                    }
                },
                Err(error) => {
                    tracing::error!(index, "Question failed: {}", error);
                    return ERROR_FALLBACK.to_string();
                }
            }
        }
    }

    /// One full attempt: retrieve context, render the prompt, complete.
    async fn answer_once(&self, question: &str) -> AppResult<String> {
        let context = self
            .retriever
            .retrieve(question, self.settings.top_k)
            .await?;

        let rendered = self.prompt.render(question, &context)?;

        let request = LlmRequest::new(rendered, &self.settings.model).with_temperature(0.0);
        let response = self.llm.complete(&request).await?;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Ok(NOT_AVAILABLE_PHRASE.to_string());
        }

        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackrx_core::AppError;
    use hackrx_llm::{LlmResponse, LlmUsage};
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    struct FixedRetriever;

    #[async_trait::async_trait]
    impl ContextRetriever for FixedRetriever {
        async fn retrieve(&self, _question: &str, _top_k: usize) -> AppResult<String> {
            Ok("Knee surgery is covered after 2 years.".to_string())
        }
    }

    struct FailingRetriever;

    #[async_trait::async_trait]
    impl ContextRetriever for FailingRetriever {
        async fn retrieve(&self, _question: &str, _top_k: usize) -> AppResult<String> {
            Err(AppError::Index("index offline".to_string()))
        }
    }

    /// Echoes the question back so tests can check answer alignment. The
    /// question is recovered from the rendered prompt's QUESTION section.
    struct EchoLlm;

    fn question_from_prompt(prompt: &str) -> String {
        prompt
            .split("QUESTION:\n")
            .nth(1)
            .and_then(|rest| rest.split('\n').next())
            .unwrap_or("")
            .to_string()
    }

    fn response(content: impl Into<String>) -> LlmResponse {
        LlmResponse {
            content: content.into(),
            model: "test-model".to_string(),
            usage: LlmUsage::default(),
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for EchoLlm {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            Ok(response(format!(
                "answer to: {}",
                question_from_prompt(&request.prompt)
            )))
        }
    }

    /// Tracks how many completions are in flight at once.
    struct GaugeLlm {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl GaugeLlm {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for GaugeLlm {
        fn provider_name(&self) -> &str {
            "gauge"
        }

        async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(response("ok"))
        }
    }

    /// Fails with throttling a fixed number of times, then succeeds.
    struct ThrottledLlm {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait::async_trait]
    impl LlmClient for ThrottledLlm {
        fn provider_name(&self) -> &str {
            "throttled"
        }

        async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(AppError::RateLimited("quota exceeded".to_string()))
            } else {
                Ok(response("recovered"))
            }
        }
    }

    /// Throttles prompts containing a marker substring on every attempt;
    /// answers everything else.
    struct SelectiveThrottleLlm {
        poison: &'static str,
    }

    #[async_trait::async_trait]
    impl LlmClient for SelectiveThrottleLlm {
        fn provider_name(&self) -> &str {
            "selective-throttle"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            if request.prompt.contains(self.poison) {
                Err(AppError::RateLimited("quota exceeded".to_string()))
            } else {
                Ok(response(format!(
                    "answer to: {}",
                    question_from_prompt(&request.prompt)
                )))
            }
        }
    }

    /// Fails only for prompts containing a marker substring.
    struct SelectiveLlm {
        poison: &'static str,
    }

    #[async_trait::async_trait]
    impl LlmClient for SelectiveLlm {
        fn provider_name(&self) -> &str {
            "selective"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            if request.prompt.contains(self.poison) {
                Err(AppError::Llm("model refused".to_string()))
            } else {
                Ok(response(format!(
                    "answer to: {}",
                    question_from_prompt(&request.prompt)
                )))
            }
        }
    }

    fn settings(concurrency: usize, max_attempts: u32, retry_delay: Duration) -> EngineSettings {
        EngineSettings {
            concurrency,
            top_k: 3,
            max_attempts,
            retry_delay,
            model: "test-model".to_string(),
        }
    }

    fn engine(llm: Arc<dyn LlmClient>, settings: EngineSettings) -> QaEngine {
        QaEngine::new(Arc::new(FixedRetriever), llm, settings).unwrap()
    }

    fn questions(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_retry_policy_budget() {
        let mut policy = RetryPolicy::new(3, Duration::from_secs(15));
        assert_eq!(policy.backoff(), Some(Duration::from_secs(15)));
        assert_eq!(policy.backoff(), Some(Duration::from_secs(15)));
        assert_eq!(policy.backoff(), None);
    }

    #[test]
    fn test_retry_policy_single_attempt() {
        let mut policy = RetryPolicy::new(1, Duration::from_secs(15));
        assert_eq!(policy.backoff(), None);
    }

    #[tokio::test]
    async fn test_answers_align_with_input_order() {
        let engine = engine(
            Arc::new(EchoLlm),
            settings(2, 3, Duration::from_millis(1)),
        );

        let batch = questions(&["first?", "second?", "third?", "fourth?"]);
        let answers = engine.answer_all(&batch).await;

        assert_eq!(
            answers,
            vec![
                "answer to: first?",
                "answer to: second?",
                "answer to: third?",
                "answer to: fourth?",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_batch_yields_empty_answers() {
        let engine = engine(
            Arc::new(EchoLlm),
            settings(2, 3, Duration::from_millis(1)),
        );
        let answers = engine.answer_all(&[]).await;
        assert!(answers.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_limit() {
        let llm = Arc::new(GaugeLlm::new());
        let engine = engine(llm.clone(), settings(2, 3, Duration::from_millis(1)));

        let batch = questions(&["a", "b", "c", "d", "e", "f"]);
        engine.answer_all(&batch).await;

        assert!(llm.peak.load(Ordering::SeqCst) <= 2);
        assert!(llm.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_question_retries_and_recovers() {
        let llm = Arc::new(ThrottledLlm {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let engine = engine(llm.clone(), settings(2, 3, Duration::from_secs(15)));

        let answers = engine.answer_all(&questions(&["only question"])).await;

        assert_eq!(answers, vec!["recovered"]);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_yield_busy_fallback() {
        let llm = Arc::new(ThrottledLlm {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        });
        let engine = engine(llm.clone(), settings(2, 3, Duration::from_secs(15)));

        let answers = engine.answer_all(&questions(&["only question"])).await;

        assert_eq!(answers, vec![BUSY_FALLBACK]);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_question_gets_busy_fallback_among_siblings() {
        // One question stays rate-limited through every attempt; the other
        // two must come back normally in their own slots.
        let engine = engine(
            Arc::new(SelectiveThrottleLlm { poison: "throttled?" }),
            settings(2, 3, Duration::from_secs(15)),
        );

        let batch = questions(&["fine one?", "throttled?", "fine two?"]);
        let answers = engine.answer_all(&batch).await;

        assert_eq!(answers[0], "answer to: fine one?");
        assert_eq!(answers[1], BUSY_FALLBACK);
        assert_eq!(answers[2], "answer to: fine two?");
    }

    #[tokio::test]
    async fn test_repeated_batches_give_identical_answers() {
        let engine = engine(
            Arc::new(EchoLlm),
            settings(2, 3, Duration::from_millis(1)),
        );

        let batch = questions(&["Is knee surgery covered?", "What is the waiting period?"]);
        let first = engine.answer_all(&batch).await;
        let second = engine.answer_all(&batch).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_question_does_not_disturb_siblings() {
        let engine = engine(
            Arc::new(SelectiveLlm { poison: "broken?" }),
            settings(2, 3, Duration::from_millis(1)),
        );

        let batch = questions(&["fine one?", "broken?", "fine two?"]);
        let answers = engine.answer_all(&batch).await;

        assert_eq!(answers[0], "answer to: fine one?");
        assert_eq!(answers[1], ERROR_FALLBACK);
        assert_eq!(answers[2], "answer to: fine two?");
    }

    #[tokio::test]
    async fn test_retriever_failure_yields_error_fallback() {
        let engine = QaEngine::new(
            Arc::new(FailingRetriever),
            Arc::new(EchoLlm),
            settings(2, 3, Duration::from_millis(1)),
        )
        .unwrap();

        let answers = engine.answer_all(&questions(&["anything"])).await;
        assert_eq!(answers, vec![ERROR_FALLBACK]);
    }

    #[tokio::test]
    async fn test_blank_completion_becomes_not_available_phrase() {
        struct BlankLlm;

        #[async_trait::async_trait]
        impl LlmClient for BlankLlm {
            fn provider_name(&self) -> &str {
                "blank"
            }

            async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
                Ok(response("   \n"))
            }
        }

        let engine = engine(
            Arc::new(BlankLlm),
            settings(2, 3, Duration::from_millis(1)),
        );

        let answers = engine.answer_all(&questions(&["anything"])).await;
        assert_eq!(answers, vec![NOT_AVAILABLE_PHRASE]);
    }

    #[tokio::test]
    async fn test_answers_are_trimmed() {
        struct PaddedLlm;

        #[async_trait::async_trait]
        impl LlmClient for PaddedLlm {
            fn provider_name(&self) -> &str {
                "padded"
            }

            async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
                Ok(response("  Yes, it is covered.\n"))
            }
        }

        let engine = engine(
            Arc::new(PaddedLlm),
            settings(2, 3, Duration::from_millis(1)),
        );

        let answers = engine.answer_all(&questions(&["covered?"])).await;
        assert_eq!(answers, vec!["Yes, it is covered."]);
    }
}
