//! Path template interpolation
//!
//! Stream paths carry `{placeholder}` tokens such as
//! `/organizations/{organization_name}/databases`. Tokens are filled from the
//! context a parent stream derived from one of its records. Values are
//! percent-encoded, so a name holding `/`, `?` or `#` stays one segment.

use crate::error::{Error, Result};
use crate::types::Context;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Render a path template with the given context
///
/// Every placeholder must resolve to a string, number or boolean; a missing
/// or null value is an error rather than an empty path segment.
pub fn render(template: &str, ctx: &Context) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut last = 0;
    let mut errors = Vec::new();

    for cap in PLACEHOLDER_REGEX.captures_iter(template) {
        let (Some(full), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        result.push_str(&template[last..full.start()]);
        last = full.end();

        match ctx.get(name.as_str()).map(value_to_segment) {
            Some(Ok(segment)) => result.push_str(&segment),
            Some(Err(e)) => return Err(e),
            None => errors.push(name.as_str().to_string()),
        }
    }
    result.push_str(&template[last..]);

    if errors.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Check if a string contains placeholders
pub fn has_templates(s: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(s)
}

/// Extract all placeholder names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Convert a context value to an encoded path segment
fn value_to_segment(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(encode_segment(s)),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(Error::template("placeholder value is null")),
        other => Err(Error::template(format!(
            "placeholder value must be a scalar, got {other}"
        ))),
    }
}

/// Percent-encode everything outside the unreserved set
fn encode_segment(raw: &str) -> String {
    // Form encoding writes a space as `+`; a literal `+` is already `%2B`
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
