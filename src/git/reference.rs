//! Branch and ref name validation

use crate::error::FetchError;
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

/// Characters and sequences git refuses in ref names
static INVALID_REF: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(\.\.|@\{|//|[\x00-\x20~^:?*\[\\\x7f])"));

/// Validate a branch or ref name before it reaches `git checkout`
///
/// Follows `git check-ref-format` closely enough to reject names that would
/// either fail late or be parsed by git as an option.
///
/// # Errors
///
/// Returns a configuration error describing the first rule the name breaks
pub fn validate_reference(reference: &str) -> Result<()> {
    let invalid = |reason: &str| -> anyhow::Error {
        FetchError::configuration(format!("Invalid branch name '{reference}': {reason}")).into()
    };

    if reference.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if reference.starts_with('-') {
        return Err(invalid("must not start with '-'"));
    }
    if reference == "@" {
        return Err(invalid("'@' alone is not a branch"));
    }
    if reference.starts_with('/') || reference.ends_with('/') || reference.ends_with('.') {
        return Err(invalid("must not start or end with '/' or end with '.'"));
    }
    if reference.ends_with(".lock") {
        return Err(invalid("must not end with '.lock'"));
    }
    if reference.split('/').any(|part| part.starts_with('.')) {
        return Err(invalid("path components must not start with '.'"));
    }

    let pattern = INVALID_REF
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Invalid ref pattern: {e}"))?;
    if let Some(found) = pattern.find(reference) {
        return Err(invalid(&format!("contains forbidden sequence {:?}", found.as_str())));
    }

    Ok(())
}
