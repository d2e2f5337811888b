//! Message validation, kept as a pure function so the rule is testable
//! without a database or request context.

use thiserror::Error;

/// Structured validation failure naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct ValidationFailure {
    pub field: &'static str,
    pub reason: String,
}

/// A message is valid iff its raw length is within [1, max_chars].
/// Length is counted in characters, not bytes, and the input is not
/// trimmed first: a whitespace-only message is still a message.
pub fn validate_message(message: &str, max_chars: usize) -> Result<(), ValidationFailure> {
    if message.is_empty() {
        return Err(ValidationFailure {
            field: "message",
            reason: "is required".to_string(),
        });
    }

    if message.chars().count() > max_chars {
        return Err(ValidationFailure {
            field: "message",
            reason: format!("may not be longer than {} characters", max_chars),
        });
    }

    Ok(())
}
