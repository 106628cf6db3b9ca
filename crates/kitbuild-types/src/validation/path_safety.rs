//! Relative path safety validation.

use crate::error::{ErrorCode, ValidationError, ValidationResult};

/// Checks if a relative output path is safe.
///
/// # Arguments
/// * `path` - The path to validate
///
/// # Returns
/// * `true` if the path is safe, `false` otherwise.
pub fn is_safe_relative_path(path: &str) -> bool {
    relative_path_errors(path).is_empty()
}

/// Validates a relative path stored at `field` in the config.
pub(super) fn validate_relative_path(path: &str, field: &str, result: &mut ValidationResult) {
    for message in relative_path_errors(path) {
        result.add_error(ValidationError::with_path(
            ErrorCode::UnsafePath,
            message,
            field,
        ));
    }
}

/// Returns one message per rule the path violates.
pub fn relative_path_errors(path: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if path.is_empty() {
        errors.push("path cannot be empty".to_string());
        return errors;
    }

    // Absolute paths (leading slash or backslash)
    if path.starts_with('/') || path.starts_with('\\') {
        errors.push(format!("path must be relative, not absolute: '{}'", path));
    }

    // Windows drive letter
    if path.len() >= 2 && path.chars().nth(1) == Some(':') {
        errors.push(format!("path must not contain drive letter: '{}'", path));
    }

    if path.contains('\\') {
        errors.push(format!("path must use forward slashes only: '{}'", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        errors.push(format!("path must not contain '..': '{}'", path));
    }

    errors
}
