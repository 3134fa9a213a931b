//! Identifier quoting.
//!
//! Table and column names cannot be bound as statement parameters, so they
//! are interpolated into SQL text. Every interpolation in this workspace
//! goes through [`quote_identifier`], which rejects names that cannot be
//! represented safely and otherwise emits a double-quoted identifier with
//! embedded quotes doubled.

use crate::error::{CoreError, Result};

/// Checks that `name` can be used as a quoted identifier.
///
/// Names must be non-empty and must not contain NUL or other control
/// characters. Any other text, including spaces, quotes and non-ASCII
/// letters, is accepted because existing databases may use it.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_control) {
        return Err(CoreError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Quotes `name` for interpolation into SQL text.
///
/// # Errors
///
/// Returns [`CoreError::InvalidIdentifier`] if the name fails
/// [`validate_identifier`].
///
/// # Examples
///
/// ```
/// use sqlite_admin_core::quote_identifier;
///
/// assert_eq!(quote_identifier("users").unwrap(), r#""users""#);
/// assert_eq!(quote_identifier(r#"odd"name"#).unwrap(), r#""odd""name""#);
/// assert!(quote_identifier("").is_err());
/// ```
pub fn quote_identifier(name: &str) -> Result<String> {
    validate_identifier(name)?;
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Ok(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_wrapped() {
        assert_eq!(quote_identifier("t").unwrap(), "\"t\"");
        assert_eq!(quote_identifier("my table").unwrap(), "\"my table\"");
        assert_eq!(quote_identifier("café").unwrap(), "\"café\"");
    }

    #[test]
    fn test_injection_attempt_stays_inside_quotes() {
        let quoted = quote_identifier(r#"x"; DROP TABLE users; --"#).unwrap();
        assert_eq!(quoted, r#""x""; DROP TABLE users; --""#);
    }

    #[test]
    fn test_rejects_empty_and_control_characters() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("a\0b").is_err());
        assert!(validate_identifier("line\nbreak").is_err());
        assert!(validate_identifier("tab\there").is_err());
    }
}
