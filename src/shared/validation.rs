use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed.
///
/// Used as a `#[validate(custom(function = ...))]` hook so that `"   "` is not
/// accepted as a category name even though it satisfies `length(min = 1)`.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Formats `validator` errors into a single line for `AppError::Validation`
pub fn describe_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, reasons.join(", "))
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
