//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted court identifier.
const MAX_COURT_ID_LEN: usize = 32;

/// Validates that a court ID is a lowercase slug such as `court-1`.
///
/// # Examples
///
/// ```ignore
/// validate_court_id("court-1")  // Ok
/// validate_court_id("Court-1")  // Err - uppercase
/// validate_court_id("-court")   // Err - leading dash
/// ```
pub fn validate_court_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_COURT_ID_LEN {
        let mut err = ValidationError::new("court_id_length");
        err.message = Some(
            format!(
                "Court ID must be between 1 and {MAX_COURT_ID_LEN} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase() || c == '-')
        || id.starts_with('-')
        || id.ends_with('-')
    {
        let mut err = ValidationError::new("court_id_format");
        err.message = Some(
            "Court ID must contain lowercase letters, digits and inner dashes only".into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name is not made of whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_court_id_valid() {
        assert!(validate_court_id("court-1").is_ok());
        assert!(validate_court_id("centre").is_ok());
        assert!(validate_court_id("hall-b-2").is_ok());
    }

    #[test]
    fn test_validate_court_id_invalid_length() {
        assert!(validate_court_id("").is_err());
        assert!(validate_court_id(&"c".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_court_id_invalid_format() {
        assert!(validate_court_id("Court-1").is_err()); // uppercase
        assert!(validate_court_id("court 1").is_err()); // space
        assert!(validate_court_id("-court").is_err());
        assert!(validate_court_id("court-").is_err());
        assert!(validate_court_id("court_1").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Jane").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}
