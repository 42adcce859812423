//! Bridges `validator` derive output into the API error taxonomy.

use bookden_http::error::{ApiError, FieldError};
use validator::Validate;

/// Validate a request payload, converting field violations into a 400
/// response with per-field messages.
pub fn check(payload: &impl Validate) -> Result<(), ApiError> {
    let Err(report) = payload.validate() else {
        return Ok(());
    };

    let mut errors = Vec::new();
    for (field, violations) in report.field_errors() {
        for violation in violations {
            let message = violation
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            errors.push(FieldError::new(field.to_string(), message));
        }
    }

    Err(ApiError::validation(errors))
}
