//! Scripted in-memory backend for tests
//!
//! Replays a fixed reply for `generate` and a fixed sequence of fragments
//! (optionally interrupted by a failure) for `generate_stream`, recording
//! every prompt it receives.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BackendError, InferenceBackend, TextStream};
use crate::config::GenerationConfig;

/// One step of a scripted stream
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Text(String),
    Fail(String),
}

impl ScriptStep {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

/// A prompt the backend was asked to run
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub config: GenerationConfig,
    pub streaming: bool,
}

pub struct ScriptedBackend {
    reply: Result<String, String>,
    steps: Vec<ScriptStep>,
    start_failure: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    /// Backend whose `generate` fails and whose stream is empty
    pub fn new() -> Self {
        Self {
            reply: Err("no scripted reply".to_string()),
            steps: Vec::new(),
            start_failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Ok(reply.into());
        self
    }

    pub fn with_reply_error(mut self, message: impl Into<String>) -> Self {
        self.reply = Err(message.into());
        self
    }

    pub fn with_stream(mut self, steps: Vec<ScriptStep>) -> Self {
        self.steps = steps;
        self
    }

    /// Make `generate_stream` fail before producing a stream
    pub fn failing_stream_start(mut self, message: impl Into<String>) -> Self {
        self.start_failure = Some(message.into());
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn record(&self, prompt: &str, config: &GenerationConfig, streaming: bool) {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            config: config.clone(),
            streaming,
        });
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, BackendError> {
        self.record(prompt, config, false);
        self.reply.clone().map_err(BackendError::Stream)
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<TextStream, BackendError> {
        self.record(prompt, config, true);
        if let Some(ref message) = self.start_failure {
            return Err(BackendError::Stream(message.clone()));
        }

        let items: Vec<Result<String, BackendError>> = self
            .steps
            .iter()
            .map(|step| match step {
                ScriptStep::Text(text) => Ok(text.clone()),
                ScriptStep::Fail(message) => Err(BackendError::Stream(message.clone())),
            })
            .collect();
        Ok(Box::pin(futures_util::stream::iter(items)))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_replays_reply_and_records_calls() {
        let backend = ScriptedBackend::new().with_reply("a, b");
        let config = GenerationConfig::precise(0.2, 100);

        assert_eq!(backend.generate("p1", &config).await.unwrap(), "a, b");
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "p1");
        assert!(!calls[0].streaming);
    }

    #[tokio::test]
    async fn test_stream_replays_steps() {
        let backend = ScriptedBackend::new().with_stream(vec![
            ScriptStep::text("x"),
            ScriptStep::fail("boom"),
        ]);
        let stream = backend
            .generate_stream("p", &GenerationConfig::default())
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_start_failure() {
        let backend = ScriptedBackend::new().failing_stream_start("down");
        assert!(backend
            .generate_stream("p", &GenerationConfig::default())
            .await
            .is_err());
    }
}
