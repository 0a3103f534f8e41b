//! Shared reqwest plumbing: error classification and body previews.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use tripcrew_core::api::{ModelError, ToolError};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Unknown,
}

impl HttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Unknown => "unknown",
        }
    }

    pub fn of(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_request() {
            Self::Request
        } else if err.is_body() {
            Self::Body
        } else if err.is_decode() {
            Self::Decode
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one outbound call, before it is mapped to a domain error.
#[derive(Debug)]
pub enum HttpFailure {
    Transport { kind: HttpErrorKind, message: String },
    Status { status: u16, body: String },
    Decode { message: String },
}

impl HttpFailure {
    fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        HttpFailure::Transport {
            kind: HttpErrorKind::of(&err),
            message: format!("{err} (url={url})"),
        }
    }

    pub fn into_tool_error(self, tool: &str) -> ToolError {
        let tool = tool.to_string();
        match self {
            HttpFailure::Transport { kind, message } => ToolError::Transport {
                tool,
                kind: kind.as_str(),
                message,
            },
            HttpFailure::Status { status, body } => ToolError::Status { tool, status, body },
            HttpFailure::Decode { message } => ToolError::Malformed { tool, message },
        }
    }

    pub fn into_model_error(self) -> ModelError {
        match self {
            HttpFailure::Transport { kind, message } => ModelError::Transport {
                kind: kind.as_str(),
                message,
            },
            HttpFailure::Status { status, body } => ModelError::Status { status, body },
            HttpFailure::Decode { message } => ModelError::Malformed(message),
        }
    }
}

pub fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()?;
    Ok(client)
}

pub fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().nth(BODY_PREVIEW_LIMIT).is_some() {
        out.push_str("...");
    }
    out
}

/// Sends the request and returns the body of a 2xx response.
pub async fn send_text(req: reqwest::RequestBuilder, url: &str) -> Result<String, HttpFailure> {
    let resp = req
        .send()
        .await
        .map_err(|err| HttpFailure::from_reqwest(err, url))?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|err| HttpFailure::from_reqwest(err, url))?;

    if !status.is_success() {
        return Err(HttpFailure::Status {
            status: status.as_u16(),
            body: preview_body(&body),
        });
    }
    Ok(body)
}

/// Like [`send_text`], then decodes the body as JSON.
pub async fn send_json(req: reqwest::RequestBuilder, url: &str) -> Result<Value, HttpFailure> {
    let body = send_text(req, url).await?;
    serde_json::from_str::<Value>(&body).map_err(|err| HttpFailure::Decode {
        message: format!(
            "failed to decode response body: {err} | body={}",
            preview_body(&body)
        ),
    })
}
