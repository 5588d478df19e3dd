use crate::error::AppError;
use crate::models::{Category, NewFeedback, SubmitFeedback};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 200;
pub const BODY_MAX_CHARS: usize = 1000;

/// Checks a submission and returns the trimmed fields. The first failed rule
/// rejects the whole payload.
pub fn validate_submission(payload: SubmitFeedback) -> Result<NewFeedback, AppError> {
    let title = payload.title.as_deref().map(str::trim).unwrap_or_default();
    let title_len = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
        return Err(AppError::Validation(format!(
            "Title must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"
        )));
    }

    let body = payload.body.as_deref().map(str::trim).unwrap_or_default();
    if body.chars().count() > BODY_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Body must be {BODY_MAX_CHARS} characters or less"
        )));
    }

    let category = payload
        .category
        .as_deref()
        .and_then(|c| c.parse::<Category>().ok())
        .ok_or_else(|| {
            AppError::Validation("Category must be one of: bug, idea, ux".to_string())
        })?;

    Ok(NewFeedback {
        title: title.to_string(),
        body: (!body.is_empty()).then(|| body.to_string()),
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payload(title: &str, body: Option<&str>, category: &str) -> SubmitFeedback {
        SubmitFeedback {
            title: Some(title.to_string()),
            body: body.map(str::to_string),
            category: Some(category.to_string()),
        }
    }

    #[rstest]
    #[case(3, true)]
    #[case(200, true)]
    #[case(2, false)]
    #[case(201, false)]
    fn title_length_bounds(#[case] len: usize, #[case] ok: bool) {
        let title = "a".repeat(len);
        let result = validate_submission(payload(&title, None, "bug"));
        assert_eq!(result.is_ok(), ok, "title of {len} chars");
    }

    #[test]
    fn title_is_measured_after_trimming() {
        let result = validate_submission(payload("  ab  ", None, "bug"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn title_counts_characters_not_bytes() {
        let title = "é".repeat(200);
        assert!(validate_submission(payload(&title, None, "ux")).is_ok());
    }

    #[test]
    fn missing_title_is_rejected() {
        let result = validate_submission(SubmitFeedback {
            category: Some("idea".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[rstest]
    #[case(1000, true)]
    #[case(1001, false)]
    fn body_length_bound(#[case] len: usize, #[case] ok: bool) {
        let body = "b".repeat(len);
        let result = validate_submission(payload("Valid title", Some(&body), "idea"));
        assert_eq!(result.is_ok(), ok, "body of {len} chars");
    }

    #[rstest]
    #[case("")]
    #[case("feature")]
    #[case("BUG")]
    fn unknown_category_is_rejected(#[case] category: &str) {
        let result = validate_submission(payload("Valid title", None, category));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn fields_are_trimmed_and_blank_body_dropped() {
        let new = validate_submission(payload("  Add dark mode ", Some("   "), "idea")).unwrap();
        assert_eq!(new.title, "Add dark mode");
        assert_eq!(new.body, None);
        assert_eq!(new.category, Category::Idea);

        let new = validate_submission(payload("Export", Some(" as CSV\n"), "ux")).unwrap();
        assert_eq!(new.body.as_deref(), Some("as CSV"));
    }
}
