//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a template name is a plain folder name.
///
/// Rejects empty names and anything that could traverse out of the templates
/// root (`/`, `\`, `..`).
pub fn validate_template_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("template_name_empty");
        err.message = Some("Template name must not be empty".into());
        return Err(err);
    }

    if name.contains('/') || name.contains('\\') || name.contains("..") {
        let mut err = ValidationError::new("template_name_path");
        err.message = Some("Template name must not contain path separators".into());
        return Err(err);
    }

    Ok(())
}
