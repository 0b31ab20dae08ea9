//! Client-side form validation and date formats.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::TodoForm;

pub const TEXT_MIN_CHARS: usize = 3;
pub const TEXT_MAX_CHARS: usize = 120;

/// How dates are shown to people, e.g. `2024/06/01`.
pub const DISPLAY_DATE_FORMAT: &str = "%Y/%m/%d";
/// How dates are typed into forms and sent to the API, e.g. `2024-06-01`.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Check a form against an item created on `creation`.
///
/// For a new item pass today's local date. A due date on the creation day
/// itself is accepted.
pub fn validate_form(form: &TodoForm, creation: NaiveDate) -> Result<(), ValidationError> {
    validate_text(form)?;

    if let Some(due) = form.due_date {
        if due < creation {
            return Err(ValidationError::DueDateBeforeCreation { creation });
        }
    }

    Ok(())
}

/// Text must be 3 to 120 characters, inclusive.
pub fn validate_text(form: &TodoForm) -> Result<(), ValidationError> {
    let chars = form.text.chars().count();
    if !(TEXT_MIN_CHARS..=TEXT_MAX_CHARS).contains(&chars) {
        return Err(ValidationError::TextLength {
            min: TEXT_MIN_CHARS,
            max: TEXT_MAX_CHARS,
        });
    }
    Ok(())
}

pub fn format_for_display(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub fn parse_input_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input.trim(), INPUT_DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn created(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_due_date_before_creation() {
        let form = TodoForm::new("File taxes", Priority::High)
            .with_due_date(parse_input_date("2024-01-01").unwrap());
        let err = validate_form(&form, created(2024, 6, 1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Due Date can't be set before the creation date: 2024/06/01"
        );
    }

    #[test]
    fn accepts_due_date_on_creation_day() {
        let form = TodoForm::new("File taxes", Priority::High)
            .with_due_date(parse_input_date("2024-06-01").unwrap());
        assert!(validate_form(&form, created(2024, 6, 1)).is_ok());
    }

    #[test]
    fn text_length_bounds_are_inclusive() {
        let at = created(2024, 6, 1);
        assert!(validate_form(&TodoForm::new("abc", Priority::Low), at).is_ok());
        assert!(validate_form(&TodoForm::new("a".repeat(120), Priority::Low), at).is_ok());
        assert_eq!(
            validate_form(&TodoForm::new("ab", Priority::Low), at),
            Err(ValidationError::TextLength { min: 3, max: 120 })
        );
        assert!(validate_form(&TodoForm::new("a".repeat(121), Priority::Low), at).is_err());
    }

    #[test]
    fn text_length_counts_characters_not_bytes() {
        let at = created(2024, 6, 1);
        assert!(validate_form(&TodoForm::new("ñañ", Priority::Low), at).is_ok());
    }

    #[test]
    fn dates_format_for_display() {
        let date = parse_input_date(" 2024-06-01 ").unwrap();
        assert_eq!(format_for_display(date), "2024/06/01");
        assert!(parse_input_date("2024/06/01").is_err());
    }
}
