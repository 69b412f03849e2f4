//! Client for the local vision-inference endpoint.
//!
//! The endpoint speaks a minimal JSON contract: POST
//! `{model, prompt, images: [base64], stream: false}` and get back
//! `{response: "..."}`. The model identifier is an opaque string here;
//! whether it names something the service can actually run is the
//! service's concern.
//!
//! Every failure path comes back as an [`AnalysisResult`] value. The caller
//! never has to guard against this client unwinding, which keeps the
//! capture pipeline reusable after a dead or misbehaving model server.

use crate::config::Config;
use serde::{Deserialize, Serialize};

/// Model identifiers offered in the UI. The service may know more.
pub const SUPPORTED_MODELS: &[&str] = &["llama3.2-vision", "minicpm-v"];

/// Prompt used when the user submits a blank one.
pub const DEFAULT_PROMPT: &str =
    "What do you see in this image? Please provide a clear and concise description.";

const EMPTY_RESPONSE_FALLBACK: &str = "No response from model";

/// Broad classification of an analysis failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The endpoint answered with a non-success HTTP status.
    Service,
    /// The request never completed: connection refused, timeout, or a
    /// response body that could not be parsed.
    Transport,
}

/// Outcome of one analysis request. Exactly one side is populated.
///
/// Re-issuing the same request is safe; the model is not deterministic, so
/// a different text on the second attempt is expected rather than a bug.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    /// The model produced a description.
    Success(String),
    /// The request failed; `message` is suitable for showing to the user.
    Failure { kind: FailureKind, message: String },
}

impl AnalysisResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The text to show the user, success or not.
    pub fn display_text(&self) -> String {
        match self {
            Self::Success(text) => text.clone(),
            Self::Failure { message, .. } => format!("Error: {}", message),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<&'a str>,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Client for a local vision-language inference service.
pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: String,
}

impl InferenceClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(config.endpoint.clone())
    }

    /// Creates a client against an explicit endpoint URL.
    pub fn with_endpoint(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Sends an encoded image and prompt to the inference endpoint.
    ///
    /// A blank prompt falls back to [`DEFAULT_PROMPT`]. The call blocks the
    /// calling task until the service answers or the transport gives up;
    /// run it off the UI thread.
    pub async fn analyze(&self, image_base64: &str, model: &str, prompt: &str) -> AnalysisResult {
        let prompt = if prompt.trim().is_empty() {
            DEFAULT_PROMPT
        } else {
            prompt
        };

        let request = GenerateRequest {
            model,
            prompt,
            images: vec![image_base64],
            stream: false,
        };

        tracing::debug!(model, endpoint = %self.endpoint, "submitting analysis request");

        let response = match self.http.post(&self.endpoint).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "inference request failed to send");
                return AnalysisResult::failure(FailureKind::Transport, e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "inference endpoint returned an error status");
            return AnalysisResult::failure(FailureKind::Service, status.as_str());
        }

        match response.json::<GenerateResponse>().await {
            Ok(body) => AnalysisResult::success(
                body.response
                    .unwrap_or_else(|| EMPTY_RESPONSE_FALLBACK.to_string()),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "inference response body was malformed");
                AnalysisResult::failure(FailureKind::Transport, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves exactly one canned HTTP response on a random local port and
    /// returns the URL to hit.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();

            // Drain the request: headers, then content-length worth of body.
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            let body_start = loop {
                let n = stream.read(&mut chunk).unwrap();
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let headers = String::from_utf8_lossy(&request[..body_start]).to_lowercase();
            let content_length: usize = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0);

            let mut received = request.len() - body_start;
            while received < content_length {
                let n = stream.read(&mut chunk).unwrap();
                received += n;
            }

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn success_response_yields_text() {
        let url = serve_once("HTTP/1.1 200 OK", r#"{"response":"a cat"}"#);
        let client = InferenceClient::with_endpoint(url);

        let result = client.analyze("aW1n", "llama3.2-vision", "what is this?").await;
        assert_eq!(result, AnalysisResult::success("a cat"));
    }

    #[tokio::test]
    async fn server_error_yields_service_failure_with_status() {
        let url = serve_once("HTTP/1.1 500 Internal Server Error", "{}");
        let client = InferenceClient::with_endpoint(url);

        let result = client.analyze("aW1n", "llama3.2-vision", "").await;
        match result {
            AnalysisResult::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::Service);
                assert_eq!(message, "500");
            }
            other => panic!("expected service failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connection_refused_yields_transport_failure() {
        // Bind then drop to get a port with nothing listening on it.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = InferenceClient::with_endpoint(format!("http://127.0.0.1:{port}"));

        let result = client.analyze("aW1n", "llama3.2-vision", "hi").await;
        match result {
            AnalysisResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::Transport),
            other => panic!("expected transport failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_yields_transport_failure() {
        let url = serve_once("HTTP/1.1 200 OK", "this is not json");
        let client = InferenceClient::with_endpoint(url);

        let result = client.analyze("aW1n", "minicpm-v", "hi").await;
        match result {
            AnalysisResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::Transport),
            other => panic!("expected transport failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_response_field_falls_back() {
        let url = serve_once("HTTP/1.1 200 OK", r#"{"done":true}"#);
        let client = InferenceClient::with_endpoint(url);

        let result = client.analyze("aW1n", "llama3.2-vision", "hi").await;
        assert_eq!(result, AnalysisResult::success(EMPTY_RESPONSE_FALLBACK));
    }
}
