//! Chat endpoint client.
//!
//! One request per submission: POST `{"role": "user", "content": ...}` to the
//! configured endpoint and decode the reply. There is deliberately no timeout
//! and no cancellation; a request that never settles simply leaves its typing
//! placeholder on screen while the panel stays usable.

use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;

use crate::core::message::Message;

#[derive(Debug)]
pub enum ChatError {
    /// The server answered with a non-2xx status.
    Http(reqwest::StatusCode),
    /// The request could not be sent or the body could not be read.
    Network(reqwest::Error),
    /// The response body was not valid JSON.
    Decode(serde_json::Error),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Http(status) => write!(f, "chat request failed with status {status}"),
            ChatError::Network(source) => write!(f, "chat request failed: {source}"),
            ChatError::Decode(source) => write!(f, "chat reply was not valid JSON: {source}"),
        }
    }
}

impl StdError for ChatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ChatError::Http(_) => None,
            ChatError::Network(source) => Some(source),
            ChatError::Decode(source) => Some(source),
        }
    }
}

/// Decodes a reply body. `Ok(None)` means the body was valid JSON but did
/// not carry both `role` and `content` as strings — an array, a scalar,
/// `null`, or an object missing a field all land here and are silently
/// dropped rather than rendered or treated as failures. Only a body that is
/// not JSON at all is a decode error.
pub fn decode_reply(body: &str) -> Result<Option<Message>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    let role = value.get("role").and_then(Value::as_str);
    let content = value.get("content").and_then(Value::as_str);
    Ok(match (role, content) {
        (Some(role), Some(content)) => Some(Message::new(role, content)),
        _ => None,
    })
}

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one user message and decodes the reply.
    pub async fn send(&self, text: &str) -> Result<Option<Message>, ChatError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&Message::user(text))
            .send()
            .await
            .map_err(ChatError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Http(status));
        }

        let body = response.text().await.map_err(ChatError::Network)?;
        decode_reply(&body).map_err(ChatError::Decode)
    }
}
