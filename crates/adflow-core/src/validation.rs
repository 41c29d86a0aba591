//! Domain validation helpers.
//!
//! Validation errors always name the offending field so callers can fix the
//! request.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::constants::{MAX_NAME_LEN, MAX_TEXT_LEN, MAX_TITLE_LEN};
use crate::error::AppError;

/// Validate an entity name: non-empty after trimming, bounded length.
pub fn validate_name(field: &str, value: &str) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(field, "must not be empty"));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(AppError::validation(
            field,
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(())
}

/// Validate a deliverable title.
pub fn validate_title(field: &str, value: &str) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(field, "must not be empty"));
    }
    if trimmed.len() > MAX_TITLE_LEN {
        return Err(AppError::validation(
            field,
            format!("must be at most {} characters", MAX_TITLE_LEN),
        ));
    }
    Ok(())
}

/// Validate free text (briefs, comments).
pub fn validate_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.len() > MAX_TEXT_LEN {
        return Err(AppError::validation(
            field,
            format!("must be at most {} characters", MAX_TEXT_LEN),
        ));
    }
    Ok(())
}

/// Validate an optional date range: start must not be after end.
pub fn validate_date_range(
    starts_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (starts_on, ends_on) {
        if start > end {
            return Err(AppError::validation(
                "starts_on",
                "must not be after ends_on",
            ));
        }
    }
    Ok(())
}

/// A campaign must name at least one approver at creation time. This check
/// runs before any row is written.
pub fn validate_approver_list(approver_user_ids: &[Uuid]) -> Result<(), AppError> {
    if approver_user_ids.is_empty() {
        return Err(AppError::validation(
            "approver_user_ids",
            "at least one approver is required",
        ));
    }
    Ok(())
}

/// Rejections always carry a comment; approvals may omit it.
pub fn validate_rejection_comment(comment: Option<&str>) -> Result<(), AppError> {
    match comment {
        Some(c) if !c.trim().is_empty() => validate_text("comment", c),
        _ => Err(AppError::validation(
            "comment",
            "a comment is required when rejecting",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_name_must_not_be_empty() {
        assert!(validate_name("name", "Spring Launch").is_ok());
        let err = validate_name("name", "   ").unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "name"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_name_length_bound() {
        let long = "x".repeat(300);
        assert!(validate_name("name", &long).is_err());
    }

    #[test]
    fn test_date_range_order() {
        let early = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert!(validate_date_range(Some(early), Some(late)).is_ok());
        assert!(validate_date_range(Some(late), Some(early)).is_err());
        assert!(validate_date_range(None, Some(late)).is_ok());
        assert!(validate_date_range(Some(early), None).is_ok());
    }

    #[test]
    fn test_empty_approver_list_fails_validation() {
        let err = validate_approver_list(&[]).unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "approver_user_ids"),
            other => panic!("Expected Validation, got {:?}", other),
        }
        assert!(validate_approver_list(&[Uuid::new_v4()]).is_ok());
    }

    #[test]
    fn test_rejection_requires_comment() {
        assert!(validate_rejection_comment(None).is_err());
        assert!(validate_rejection_comment(Some("  ")).is_err());
        assert!(validate_rejection_comment(Some("colors off")).is_ok());
    }
}
