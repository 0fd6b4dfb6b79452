pub mod auth;
pub mod books;
pub mod users;

use bookshare_http::AppError;
use bookshare_kernel::ModuleRegistry;
use serde::Serialize;

use crate::state::AppState;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, state: &AppState) {
    registry.register_custom(auth::create_module(state));
    registry.register_custom(books::create_module(state));
    registry.register_custom(users::create_module(state));
}

/// `{success, message}` answer for operations with nothing else to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Parse a record id from a path segment, rejecting anything non-numeric.
pub(crate) fn parse_id(raw: &str, message: &'static str) -> Result<u64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::bad_request(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse_id("42", "Invalid book ID").unwrap(), 42);
        assert!(parse_id("abc", "Invalid book ID").is_err());
        assert!(parse_id("-1", "Invalid book ID").is_err());
        assert!(parse_id("", "Invalid book ID").is_err());
    }
}
