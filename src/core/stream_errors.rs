use std::error::Error as StdError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorKind {
    /// The credential was rejected.
    AuthError,
    QuotaExceeded,
    RateLimited,
    /// Anything else that went wrong talking to the service.
    TransportError,
    /// The stream finished without any answer text.
    EmptyResponse,
}

/// A failed model call. Its `Display` text is what the operator sees in
/// place of an answer for that turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelServiceError {
    pub kind: ModelErrorKind,
    pub detail: String,
}

impl ModelServiceError {
    pub fn new(kind: ModelErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Sort a failure description into a kind by looking for telltale
    /// substrings. Quota and rate mentions win over an `API_KEY` mention.
    pub fn classify(description: impl Into<String>) -> Self {
        let detail = description.into();
        Self {
            kind: kind_for(&detail),
            detail,
        }
    }

    /// Classify on the full failure text but keep a shorter `detail` for
    /// display, e.g. a raw JSON error body summarised to its message.
    pub fn classify_with_detail(description: &str, detail: impl Into<String>) -> Self {
        Self {
            kind: kind_for(description),
            detail: detail.into(),
        }
    }

    pub fn empty_response() -> Self {
        Self::new(
            ModelErrorKind::EmptyResponse,
            "the model returned no answer text",
        )
    }
}

fn kind_for(description: &str) -> ModelErrorKind {
    let lower = description.to_lowercase();
    if lower.contains("quota") {
        ModelErrorKind::QuotaExceeded
    } else if lower.contains("rate") {
        ModelErrorKind::RateLimited
    } else if description.contains("API_KEY") {
        ModelErrorKind::AuthError
    } else {
        ModelErrorKind::TransportError
    }
}

impl fmt::Display for ModelServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ModelErrorKind::AuthError => {
                write!(f, "❌ API key rejected, check the GEMINI_API_KEY environment variable")
            }
            ModelErrorKind::QuotaExceeded => {
                write!(f, "❌ API quota exhausted, please try again later")
            }
            ModelErrorKind::RateLimited => {
                write!(f, "❌ Too many requests, please try again later")
            }
            ModelErrorKind::TransportError => write!(f, "❌ API request failed: {}", self.detail),
            ModelErrorKind::EmptyResponse => write!(f, "❌ Empty response: {}", self.detail),
        }
    }
}

impl StdError for ModelServiceError {}
