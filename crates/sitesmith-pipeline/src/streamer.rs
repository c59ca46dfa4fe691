//! Streaming generation
//!
//! Relays provider fragments one-for-one as [`StreamChunk`]s. The first
//! failure, whether at stream start or mid-flight, becomes a single error
//! chunk and ends the stream.

use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};
use inference::{SharedBackend, TextStream};
use serde::Serialize;

use crate::prompt::PromptDocument;

/// One unit of a generation response
///
/// Serializes to `{"text": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamChunk {
    TextDelta { text: String },
    ErrorEvent { error: String },
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::ErrorEvent {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::ErrorEvent { .. })
    }

    /// JSON payload for one `data:` line of a server-sent event
    pub fn sse_data(&self) -> String {
        match self {
            Self::TextDelta { text } => serde_json::json!({ "text": text }).to_string(),
            Self::ErrorEvent { error } => serde_json::json!({ "error": error }).to_string(),
        }
    }
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

pub struct GenerationStreamer {
    backend: SharedBackend,
}

impl GenerationStreamer {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Start a streaming generation for `prompt`
    ///
    /// Never fails: a provider that cannot start the stream yields a stream
    /// holding exactly one error chunk.
    pub async fn stream(&self, prompt: &PromptDocument) -> ChunkStream {
        log::info!(
            "Sending generation request to {} (max {} tokens)",
            self.backend.name(),
            prompt.token_limit()
        );

        match self
            .backend
            .generate_stream(&prompt.text, &prompt.generation)
            .await
        {
            Ok(fragments) => relay(fragments),
            Err(e) => {
                log::error!("Failed to start generation stream: {}", e);
                Box::pin(stream::once(async move { StreamChunk::error(e.to_string()) }))
            }
        }
    }
}

/// Map provider fragments to chunks, stopping after the first error
pub fn relay(fragments: TextStream) -> ChunkStream {
    Box::pin(stream::unfold(Some(fragments), |state| async move {
        let mut fragments = state?;
        match fragments.next().await {
            Some(Ok(text)) => Some((StreamChunk::text(text), Some(fragments))),
            Some(Err(e)) => {
                log::error!("Generation stream failed: {}", e);
                Some((StreamChunk::error(e.to_string()), None))
            }
            None => None,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference::{BackendError, GenerationConfig, ScriptStep, ScriptedBackend};
    use std::sync::Arc;

    fn prompt() -> PromptDocument {
        PromptDocument {
            text: "make a site".to_string(),
            generation: GenerationConfig::default().with_max_output_tokens(6144),
        }
    }

    #[test]
    fn test_sse_payloads() {
        assert_eq!(StreamChunk::text("a\"b\n").sse_data(), r#"{"text":"a\"b\n"}"#);
        assert_eq!(StreamChunk::error("boom").sse_data(), r#"{"error":"boom"}"#);
        assert_eq!(
            serde_json::to_string(&StreamChunk::text("x")).unwrap(),
            r#"{"text":"x"}"#
        );
    }

    #[tokio::test]
    async fn test_relays_fragments_in_order() {
        let backend = Arc::new(ScriptedBackend::new().with_stream(vec![
            ScriptStep::text("```html\n"),
            ScriptStep::text("<p>hi</p>"),
            ScriptStep::text("\n```"),
        ]));
        let streamer = GenerationStreamer::new(backend.clone());

        let chunks: Vec<StreamChunk> = streamer.stream(&prompt()).await.collect().await;
        assert_eq!(
            chunks,
            vec![
                StreamChunk::text("```html\n"),
                StreamChunk::text("<p>hi</p>"),
                StreamChunk::text("\n```"),
            ]
        );

        let calls = backend.calls();
        assert!(calls[0].streaming);
        assert_eq!(calls[0].config.max_output_tokens, 6144);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_ends_stream() {
        let backend = Arc::new(ScriptedBackend::new().with_stream(vec![
            ScriptStep::text("one"),
            ScriptStep::fail("connection reset"),
            ScriptStep::text("never sent"),
        ]));
        let streamer = GenerationStreamer::new(backend);

        let chunks: Vec<StreamChunk> = streamer.stream(&prompt()).await.collect().await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], StreamChunk::text("one"));
        assert!(chunks[1].is_error());
    }

    #[tokio::test]
    async fn test_start_failure_is_single_error_chunk() {
        let backend = Arc::new(ScriptedBackend::new().failing_stream_start("quota exceeded"));
        let streamer = GenerationStreamer::new(backend);

        let chunks: Vec<StreamChunk> = streamer.stream(&prompt()).await.collect().await;
        assert_eq!(chunks.len(), 1);
        match &chunks[0] {
            StreamChunk::ErrorEvent { error } => assert!(error.contains("quota exceeded")),
            other => panic!("unexpected chunk {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_relay_of_raw_stream() {
        let fragments: TextStream = Box::pin(stream::iter(vec![
            Err(BackendError::EmptyResponse),
            Ok("late".to_string()),
        ]));
        let chunks: Vec<StreamChunk> = relay(fragments).collect().await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_error());
    }
}
