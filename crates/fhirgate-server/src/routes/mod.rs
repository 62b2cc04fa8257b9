//! HTTP route handlers

pub mod health;
pub mod info;
pub mod parser;
pub mod validation;

use crate::error::{Result, ServerError};

/// Reject empty payloads before they reach the services
pub(crate) fn require_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(ServerError::BadRequest(
            "Resource content is required".to_string(),
        ));
    }
    Ok(())
}
