pub mod meetings;

use crate::error::AppError;

/// Reads an optional positive integer query parameter.
///
/// A missing or empty value falls back to `default`.
pub fn positive_param(raw: Option<&str>, default: i64, message: &str) -> Result<i64, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => match value.parse::<i64>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(AppError::Validation(message.to_owned())),
        },
    }
}
