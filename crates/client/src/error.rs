use serde::Deserialize;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{status}: {message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            ClientError::Decode(_) => None,
        }
    }
}

/// Error body produced by the API.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub errors: Vec<String>,
}

impl ErrorBody {
    pub(crate) fn into_error(self, status: u16, fallback: &str) -> ClientError {
        ClientError::Api {
            status,
            message: self.message.unwrap_or_else(|| fallback.to_string()),
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_falls_back_to_default_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"success":false}"#).unwrap();
        let err = body.into_error(500, "Failed to fetch books");
        assert_eq!(err.to_string(), "500: Failed to fetch books");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn api_error_keeps_validation_list() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"Validation failed","errors":["Title is required"]}"#)
                .unwrap();
        match body.into_error(400, "ignored") {
            ClientError::Api { message, errors, .. } => {
                assert_eq!(message, "Validation failed");
                assert_eq!(errors, vec!["Title is required".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
