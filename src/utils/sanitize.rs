//! Identifier validation for story and user ids.
//!
//! Ids end up as record keys and query bindings, so they are restricted to a
//! conservative character set before any store is touched.

use crate::StoryError;

const MAX_ID_LEN: usize = 128;

/// Allowed characters in a story or user id.
fn is_valid_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Validate that `id` is a non-empty, bounded, safe identifier.
///
/// `field` names the offending input in the error message.
pub fn validate_identifier<'a>(field: &str, id: &'a str) -> Result<&'a str, StoryError> {
    if id.is_empty() {
        return Err(StoryError::Validation(format!("{} must not be empty", field)));
    }
    if id.len() > MAX_ID_LEN {
        return Err(StoryError::Validation(format!(
            "{} exceeds {} characters",
            field, MAX_ID_LEN
        )));
    }
    if let Some(bad) = id.chars().find(|c| !is_valid_id_char(*c)) {
        return Err(StoryError::Validation(format!(
            "{} contains invalid character '{}': '{}'",
            field, bad, id
        )));
    }
    Ok(id)
}
