//! Gemini backend implementation
//!
//! This backend talks to Google's hosted Gemini models over the REST API.
//! Streaming uses `streamGenerateContent?alt=sse`, which emits one
//! `data: {GenerateContentResponse}` event per generated fragment.

use async_trait::async_trait;
use futures_util::StreamExt;

use super::{BackendError, InferenceBackend, TextStream};
use crate::config::{GeminiConfig, GenerationConfig};
use crate::constants::gemini;
use crate::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Gemini backend using the hosted REST API
pub struct GeminiBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// API key, model and endpoint
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a backend sharing an existing HTTP client
    pub fn with_client(http_client: reqwest::Client, config: GeminiConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}:{}", self.model_url(), method)
    }

    /// POST a prompt and return the response once the status is checked
    async fn post_prompt(
        &self,
        url: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<reqwest::Response, BackendError> {
        if self.config.api_key.is_empty() {
            return Err(BackendError::NotConfigured(
                "Gemini API key is empty".to_string(),
            ));
        }

        let body = GenerateContentRequest::from_prompt(prompt, config);

        let response = self
            .http_client
            .post(url)
            .header(gemini::API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(BackendError::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, body });
        }

        Ok(response)
    }

    /// Parse SSE stream into a stream of text fragments
    fn parse_sse_stream(response: reqwest::Response) -> TextStream {
        let mut lines = SseLineBuffer::default();
        let stream = response
            .bytes_stream()
            .map(move |result| match result {
                Ok(bytes) => lines
                    .push(&bytes)
                    .iter()
                    .filter_map(|payload| parse_sse_payload(payload).transpose())
                    .collect::<Vec<_>>(),
                Err(e) => vec![Err(BackendError::Http(e))],
            })
            .flat_map(futures_util::stream::iter);

        Box::pin(stream)
    }
}

/// Reassembles SSE lines that may be split across network chunks
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Feed raw bytes, returning the payload of every completed `data:` line
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Extract the text fragment from one SSE event payload
fn parse_sse_payload(payload: &str) -> Result<Option<String>, BackendError> {
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(None);
    }

    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(payload) {
        return Err(BackendError::Stream(envelope.error.message));
    }

    let event: GenerateContentResponse = serde_json::from_str(payload)
        .map_err(|e| BackendError::InvalidResponse(format!("Malformed stream event: {}", e)))?;

    if let Some(reason) = event.block_reason() {
        return Err(BackendError::Stream(format!("Prompt blocked: {}", reason)));
    }

    Ok(event.text().filter(|text| !text.is_empty()))
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, BackendError> {
        let url = self.endpoint(gemini::GENERATE_METHOD);
        let response = self.post_prompt(&url, prompt, config).await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if let Some(reason) = body.block_reason() {
            return Err(BackendError::InvalidResponse(format!(
                "Prompt blocked: {}",
                reason
            )));
        }

        body.text().ok_or(BackendError::EmptyResponse)
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<TextStream, BackendError> {
        let url = format!("{}?alt=sse", self.endpoint(gemini::STREAM_METHOD));

        log::debug!(
            "Gemini stream request: model={}, max_output_tokens={}",
            self.config.model,
            config.max_output_tokens
        );

        let response = self.post_prompt(&url, prompt, config).await?;
        Ok(Self::parse_sse_stream(response))
    }

    async fn health_check(&self) -> bool {
        if self.config.api_key.is_empty() {
            return false;
        }
        match self
            .http_client
            .get(self.model_url())
            .header(gemini::API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Path;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;

    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn fake_gemini(Path(rest): Path<String>, headers: HeaderMap) -> axum::response::Response {
        let key = headers
            .get(gemini::API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if key != Some("test-key") {
            return (StatusCode::FORBIDDEN, "bad key").into_response();
        }
        if rest.ends_with(":streamGenerateContent") {
            let body = concat!(
                "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"```html\\n\"}]}}]}\r\n\r\n",
                "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"<p>hi</p>\"}]}}]}\r\n\r\n",
                "data: {\"candidates\":[{\"finishReason\":\"STOP\"}]}\r\n\r\n",
            );
            ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        } else {
            axum::Json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "mountains, hiking"}]}}]
            }))
            .into_response()
        }
    }

    fn backend_for(base_url: &str, key: &str) -> GeminiBackend {
        GeminiBackend::new(
            GeminiConfig::new(key)
                .with_model("test-model")
                .with_base_url(base_url),
        )
    }

    #[test]
    fn test_backend_name() {
        let backend = GeminiBackend::new(GeminiConfig::new("k"));
        assert_eq!(backend.name(), "Gemini");
    }

    #[test]
    fn test_endpoint_format() {
        let backend = backend_for("http://localhost:1234/v1beta/", "k");
        assert_eq!(
            backend.endpoint(gemini::STREAM_METHOD),
            "http://localhost:1234/v1beta/models/test-model:streamGenerateContent"
        );
    }

    #[test]
    fn test_line_buffer_joins_split_chunks() {
        let mut lines = SseLineBuffer::default();
        assert!(lines.push(b"data: {\"a\"").is_empty());
        assert_eq!(lines.push(b":1}\r\n\r\ndata: x\n"), vec!["{\"a\":1}", "x"]);
        assert!(lines.push(b": keep-alive comment\n").is_empty());
    }

    #[test]
    fn test_line_buffer_keeps_multibyte_chars_intact() {
        let mut lines = SseLineBuffer::default();
        let encoded = "data: caf\u{e9}\n".as_bytes();
        let (head, tail) = encoded.split_at(encoded.len() - 2);
        assert!(lines.push(head).is_empty());
        assert_eq!(lines.push(tail), vec!["caf\u{e9}"]);
    }

    #[test]
    fn test_parse_payload_variants() {
        let text = parse_sse_payload(r#"{"candidates":[{"content":{"parts":[{"text":"abc"}]}}]}"#);
        assert_eq!(text.unwrap().as_deref(), Some("abc"));

        let finish = parse_sse_payload(r#"{"candidates":[{"finishReason":"STOP"}]}"#);
        assert!(finish.unwrap().is_none());

        let error = parse_sse_payload(r#"{"error":{"code":500,"message":"overloaded"}}"#);
        assert!(matches!(error, Err(BackendError::Stream(ref m)) if m == "overloaded"));

        assert!(matches!(
            parse_sse_payload("not json"),
            Err(BackendError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected_locally() {
        let backend = backend_for("http://127.0.0.1:9", "");
        let result = backend.generate("x", &GenerationConfig::default()).await;
        assert!(matches!(result, Err(BackendError::NotConfigured(_))));
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_generate_against_loopback_provider() {
        let base = spawn_provider(Router::new().route("/models/*rest", post(fake_gemini))).await;
        let backend = backend_for(&base, "test-key");

        let text = backend
            .generate("topics please", &GenerationConfig::precise(0.2, 100))
            .await
            .unwrap();
        assert_eq!(text, "mountains, hiking");
    }

    #[tokio::test]
    async fn test_api_error_carries_status() {
        let base = spawn_provider(Router::new().route("/models/*rest", post(fake_gemini))).await;
        let backend = backend_for(&base, "wrong-key");

        let result = backend.generate("x", &GenerationConfig::default()).await;
        assert!(matches!(result, Err(BackendError::Api { status: 403, .. })));
    }

    #[tokio::test]
    async fn test_stream_yields_fragments_in_order() {
        let base = spawn_provider(Router::new().route("/models/*rest", post(fake_gemini))).await;
        let backend = backend_for(&base, "test-key");

        let stream = backend
            .generate_stream("build it", &GenerationConfig::default())
            .await
            .unwrap();
        let fragments: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(fragments, vec!["```html\n".to_string(), "<p>hi</p>".to_string()]);
    }
}
