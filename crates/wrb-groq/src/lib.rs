//! Groq adapter (streaming chat completions).
//!
//! Uses the OpenAI-compatible `chat/completions` endpoint with `stream: true`
//! and turns the server-sent events into a fragment stream.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde_json::{json, Value};

use wrb_core::{
    config::{DEFAULT_GROQ_API_URL, DEFAULT_GROQ_MODEL},
    errors::Error,
    ports::{CompletionClient, CompletionRequest, FragmentStream},
    Result,
};

/// Sentinel data payload closing an OpenAI-style stream.
const DONE: &str = "[DONE]";

#[derive(Clone, Debug)]
pub struct GroqClient {
    api_key: Option<String>,
    model: String,
    url: String,
    http: reqwest::Client,
}

impl GroqClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_GROQ_MODEL.to_string(),
            url: DEFAULT_GROQ_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// JSON body for a streaming chat-completion request.
    pub fn request_body(&self, req: &CompletionRequest) -> Value {
        let messages: Vec<Value> = req
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": req.temperature,
            "max_tokens": req.max_tokens,
            "top_p": req.top_p,
            "stream": true,
            "stop": req.stop,
        })
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn stream_completion(&self, req: CompletionRequest) -> Result<FragmentStream> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::Completion("GROQ_API_KEY is not set".to_string()));
        };

        let es = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&self.request_body(&req))
            .eventsource()
            .map_err(|e| Error::Completion(format!("groq request error: {e}")))?;

        tracing::debug!(model = %self.model, "groq stream opened");
        Ok(fragments(es))
    }
}

/// Adapt an event source into a finite fragment stream.
///
/// The source is closed on `[DONE]`, at the end of the body, or after the first
/// error, so it never reconnects.
fn fragments(es: EventSource) -> FragmentStream {
    futures_util::stream::unfold(Some(es), |state| async move {
        let Some(mut es) = state else {
            return None;
        };
        loop {
            match es.next().await {
                Some(Ok(Event::Open)) => continue,
                Some(Ok(Event::Message(msg))) => {
                    if msg.data.trim() == DONE {
                        es.close();
                        return None;
                    }
                    return match parse_delta_content(&msg.data) {
                        Ok(text) => Some((Ok(text), Some(es))),
                        Err(e) => {
                            es.close();
                            Some((Err(e), None))
                        }
                    };
                }
                Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => {
                    es.close();
                    return None;
                }
                Some(Err(err)) => {
                    es.close();
                    return Some((Err(map_stream_error(err)), None));
                }
            }
        }
    })
    .boxed()
}

/// Extract `choices[0].delta.content` from a chunk; absent or null content is `""`.
pub fn parse_delta_content(data: &str) -> Result<String> {
    let v: Value = serde_json::from_str(data)
        .map_err(|e| Error::Completion(format!("malformed groq chunk: {e}")))?;

    if let Some(err) = v.get("error") {
        return Err(Error::Completion(format!("groq stream error: {err}")));
    }

    Ok(v.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .to_string())
}

fn map_stream_error(err: reqwest_eventsource::Error) -> Error {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            Error::Completion(format!("groq returned status {status}"))
        }
        reqwest_eventsource::Error::Transport(e) => {
            Error::Completion(format!("groq network error: {e}"))
        }
        other => Error::Completion(format!("groq stream error: {other}")),
    }
}
