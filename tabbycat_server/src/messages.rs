use axum::headers::Cookie;
use axum::http::HeaderValue;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, Deserialize};

pub const MESSAGES_COOKIE: &str = "messages";


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn error(message: impl Into<String>) -> Self {
        FlashMessage { level: MessageLevel::Error, message: message.into() }
    }
}

/// Messages waiting in the request's cookie. A cookie that fails to decode counts as empty.
pub fn pending_messages(cookie: Option<&Cookie>) -> Vec<FlashMessage> {
    cookie
        .and_then(|c| c.get(MESSAGES_COOKIE))
        .and_then(|value| URL_SAFE_NO_PAD.decode(value).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// `Set-Cookie` value that appends `message` to the pending messages.
pub fn queue_message(cookie: Option<&Cookie>, message: FlashMessage) -> Result<HeaderValue, anyhow::Error> {
    let mut messages = pending_messages(cookie);
    messages.push(message);
    let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&messages)?);
    Ok(HeaderValue::from_str(&format!("{}={}; Path=/; HttpOnly; SameSite=Lax", MESSAGES_COOKIE, encoded))?)
}

pub fn clear_messages() -> HeaderValue {
    HeaderValue::from_static("messages=; Path=/; Max-Age=0")
}
