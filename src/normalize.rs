//! Turn "almost JSON" shell output into a JSON value.
//!
//! The shell prints documents in extended JSON, where values such as
//! `ObjectId("...")` or `Timestamp(1, 2)` are constructor calls rather than
//! JSON. Those fragments are replaced with `null` before parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{ErrorCode, Result, ShardctlError};

static FUNCTION_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*\([^()]*\)").expect("Valid regex pattern")
});

/// Rewrite raw output into text that should parse as JSON.
///
/// A bare `null` response becomes `{}` so callers always get a document.
/// All whitespace is removed, including inside string values.
pub fn clean_output(raw: &str) -> String {
    if raw.trim() == "null" {
        return "{}".to_string();
    }

    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    FUNCTION_CALL.replace_all(&compact, "null").into_owned()
}

/// Parse the output of any command other than `sh.status()`.
///
/// Fails with a parse error carrying the cleaned text when it is not JSON.
pub fn normalize_output(raw: &str) -> Result<Value> {
    let cleaned = clean_output(raw);

    serde_json::from_str(&cleaned).map_err(|e| {
        ShardctlError::parse_with_code(
            ErrorCode::PARSE_INVALID_JSON,
            format!("command output is not valid JSON ({e})"),
            Some(cleaned.clone()),
        )
        .with_source(e)
    })
}
