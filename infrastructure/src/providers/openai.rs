//! OpenAI-compatible chat-completions generator.
//!
//! Covers api.openai.com, local Ollama, and anything else that speaks the
//! same `POST /v1/chat/completions` shape. Only non-streaming requests are
//! made; a turn needs the whole reply before the document can change.

use crate::config::{FileProviderConfig, ProviderKind};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use roundtable_application::{GenerationError, GenerationRequest, TextGenerator};
use roundtable_domain::truncate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default chat-completions endpoints.
pub mod endpoint {
    pub const OPENAI: &str = "https://api.openai.com/v1/chat/completions";
    pub const OLLAMA: &str = "http://localhost:11434/v1/chat/completions";
}

/// Error bodies are cut to this many bytes in error messages.
const MAX_ERROR_BODY: usize = 500;

/// Problems building the generator. Configuration-time only.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No API key: set provider.api_key or the {0} environment variable")]
    MissingApiKey(String),

    #[error("Invalid API key header value")]
    InvalidApiKey,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Generator backed by an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
    model: String,
    kind: ProviderKind,
}

impl OpenAiGenerator {
    pub fn from_config(config: &FileProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        if config.kind == ProviderKind::OpenAi {
            let key = config
                .resolve_api_key()
                .ok_or_else(|| ProviderError::MissingApiKey(config.api_key_env.clone()))?;
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| ProviderError::InvalidApiKey)?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let default_endpoint = match config.kind {
            ProviderKind::OpenAi => endpoint::OPENAI,
            ProviderKind::Ollama => endpoint::OLLAMA,
        };
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            headers,
            endpoint,
            model: config.model.clone(),
            kind: config.kind,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let text = response.text().await.map_err(map_transport_error)?;
        debug!(status = status.as_u16(), bytes = text.len(), "Chat completion response");

        if let Some(error) = status_error(status, retry_after, &text) {
            return Err(error);
        }
        extract_content(&text)
    }

    fn label(&self) -> String {
        format!("{}:{}", self.kind, self.model)
    }
}

fn map_transport_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::RequestFailed(error.to_string())
    }
}

/// `retry-after` in whole seconds; HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn status_error(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> Option<GenerationError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(GenerationError::RateLimited { retry_after });
    }
    if status.as_u16() >= 400 {
        return Some(GenerationError::Http {
            status: status.as_u16(),
            message: truncate(body.trim(), MAX_ERROR_BODY),
        });
    }
    None
}

fn extract_content(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("malformed body: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::InvalidResponse("no message content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn ollama_config(endpoint: String) -> FileProviderConfig {
        FileProviderConfig {
            kind: ProviderKind::Ollama,
            endpoint: Some(endpoint),
            model: "llama3.1".to_string(),
            ..Default::default()
        }
    }

    /// Serve one canned HTTP response and return the request it received.
    async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if received.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&received).to_string()
        });
        (url, handle)
    }

    fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n{extra_headers}content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn test_openai_requires_key() {
        let config = FileProviderConfig {
            api_key: None,
            api_key_env: "ROUNDTABLE_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            OpenAiGenerator::from_config(&config),
            Err(ProviderError::MissingApiKey(var)) if var == "ROUNDTABLE_TEST_UNSET_KEY_VAR"
        ));
    }

    #[test]
    fn test_default_endpoints() {
        let openai = OpenAiGenerator::from_config(&FileProviderConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(openai.endpoint(), endpoint::OPENAI);
        assert_eq!(openai.label(), "openai:gpt-4o-mini");

        let ollama = OpenAiGenerator::from_config(&FileProviderConfig {
            kind: ProviderKind::Ollama,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ollama.endpoint(), endpoint::OLLAMA);
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "Hello");

        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(GenerationError::InvalidResponse(_))
        ));
        assert!(matches!(
            extract_content("not json"),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        let limited = status_error(
            StatusCode::TOO_MANY_REQUESTS,
            Some(Duration::from_secs(7)),
            "",
        )
        .unwrap();
        assert!(limited.is_rate_limited());
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(7)));

        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, None, " upstream down "),
            Some(GenerationError::Http { status: 502, message }) if message == "upstream down"
        ));
        assert!(status_error(StatusCode::OK, None, "").is_none());
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);
        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(12)));
        headers.insert(
            header::RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[tokio::test]
    async fn test_generate_round_trip() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Let's use Rust."}}]}"#;
        let (url, server) = serve_once(http_response("200 OK", "", body)).await;
        let generator = OpenAiGenerator::from_config(&ollama_config(url)).unwrap();

        let reply = generator
            .generate(&GenerationRequest::new("You are Ada.", "Pick a language."))
            .await
            .unwrap();

        assert_eq!(reply, "Let's use Rust.");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.contains(r#""model":"llama3.1""#));
        assert!(request.contains(r#"{"role":"system","content":"You are Ada."}"#));
        assert!(request.contains(r#"{"role":"user","content":"Pick a language."}"#));
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let (url, server) = serve_once(http_response(
            "429 Too Many Requests",
            "retry-after: 3\r\n",
            r#"{"error":"slow down"}"#,
        ))
        .await;
        let generator = OpenAiGenerator::from_config(&ollama_config(url)).unwrap();

        let error = generator
            .generate(&GenerationRequest::new("s", "p"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            GenerationError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(3)
        ));
        server.await.unwrap();
    }
}
