//! The JSON error envelope.
//!
//! Success payloads are plain per-route objects; failures share one shape:
//! `{"message": "..."}`, with validation failures additionally carrying the
//! full field-error list under `errors`.

use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    /// Validation failures carry every field error in one response so the
    /// client can render all problems at once.
    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            message: "Validation Error".to_string(),
            errors: Some(errors),
        }
    }
}

/// Plain `{"message": ...}` success body for routes with nothing else to say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
