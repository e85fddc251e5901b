//! Terminal output utilities.
//!
//! Provides formatting helpers for terminal output.

use crate::processing::Relation;
use colored::{ColoredString, Colorize};

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// Relation name colored by outcome.
pub fn relation_label(relation: Relation) -> ColoredString {
    match relation {
        Relation::Equals => relation.as_str().green(),
        Relation::Includes | Relation::Included => relation.as_str().yellow(),
        Relation::NoMatch => relation.as_str().red(),
    }
}

/// One-line load summary, e.g. `routes.csv: 12 good / 1 bad`.
///
/// # Arguments
/// * `name` - File name shown in the summary
/// * `good` - Lines loaded
/// * `bad` - Lines skipped
pub fn load_summary(name: &str, good: usize, bad: usize) -> String {
    let bad_text = format!("{bad} bad");
    let bad_text = if bad > 0 {
        bad_text.on_red().to_string()
    } else {
        bad_text
    };
    format!("#{name}: {good} good / {bad_text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "    \"test\"");
    }

    #[test]
    fn test_format_field_exact() {
        assert_eq!(format_field("test", 6), "\"test\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "\"long_value\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }

    #[test]
    fn test_load_summary_plain() {
        colored::control::set_override(false);
        assert_eq!(load_summary("a.csv", 3, 0), "#a.csv: 3 good / 0 bad");
        assert_eq!(load_summary("a.csv", 3, 2), "#a.csv: 3 good / 2 bad");
        assert_eq!(relation_label(Relation::Equals).to_string(), "EQUALS");
    }
}
