//! Typed errors for content resolution.
//!
//! Callers must be able to tell "upstream is broken" (`Fetch`, `Parse`,
//! `Schema`) apart from "this slug does not exist" (`NotFound`).

use thiserror::Error;

/// Maximum number of characters of a rejected payload kept in a `SchemaError`.
pub const PREVIEW_LIMIT: usize = 800;

/// Maximum number of characters of an error response body kept in a `Fetch` error.
pub const BODY_EXCERPT_LIMIT: usize = 2000;

pub type Result<T> = std::result::Result<T, ContentError>;

/// Errors that can occur while resolving content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Network failure or non-2xx response from the content API.
    #[error("{}", fetch_message(.status, .url, .body))]
    Fetch {
        /// HTTP status, absent when the request never got a response
        status: Option<u16>,
        url: String,
        /// Best-effort excerpt of the response body (or the transport error)
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to parse JSON from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The payload failed validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A single-item lookup legitimately has no match.
    #[error("{kind} with slug \"{slug}\" not found")]
    NotFound { kind: &'static str, slug: String },

    /// The API base or a request path could not be turned into a URL.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ContentError {
    /// Whether the upstream answered with a status that means "no such item".
    ///
    /// Some API generations answer unknown detail routes with 405 instead of 404.
    pub fn is_not_found_status(&self) -> bool {
        matches!(self, ContentError::Fetch { status: Some(404 | 405), .. })
    }

    /// Short machine-readable kind, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentError::Fetch { .. } => "fetch_failed",
            ContentError::Parse { .. } => "parse_failed",
            ContentError::Schema(_) => "schema_mismatch",
            ContentError::NotFound { .. } => "not_found",
            ContentError::InvalidUrl { .. } => "invalid_url",
        }
    }
}

fn fetch_message(status: &Option<u16>, url: &str, body: &str) -> String {
    let head = match status {
        Some(code) => format!("Fetch failed ({}) {}", code, url),
        None => format!("Fetch failed {}", url),
    };
    if body.is_empty() {
        head
    } else {
        format!("{}\nResponse body:\n{}", head, body)
    }
}

/// A payload was rejected by the schema validator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{context} failed validation: {reason}\n\nResponse preview:\n{preview}")]
pub struct SchemaError {
    /// What was being validated (e.g., "Content item", "Post list")
    pub context: &'static str,
    pub reason: String,
    /// Pretty-printed payload, truncated to `PREVIEW_LIMIT` characters
    pub preview: String,
}

impl SchemaError {
    pub fn new(context: &'static str, reason: impl Into<String>, raw: &serde_json::Value) -> Self {
        let serialized = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
        Self {
            context,
            reason: reason.into(),
            preview: truncate_chars(&serialized, PREVIEW_LIMIT),
        }
    }
}

/// Keep at most `max` characters, never splitting a UTF-8 code point.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
