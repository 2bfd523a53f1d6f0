//! Utility functions for payload capture
//!
//! Provides body minification and the timestamp used for synthesized
//! correlation ids.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;

/// Strip insignificant whitespace from JSON text
///
/// Text that does not parse as JSON is returned unchanged. Only whitespace
/// between tokens is removed; strings, numbers and key order are kept exactly
/// as written.
pub fn minify_json_text(text: &str) -> String {
    if serde_json::from_str::<IgnoredAny>(text).is_err() {
        return text.to_string();
    }

    let mut minified = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            minified.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            ' ' | '\t' | '\n' | '\r' => {}
            '"' => {
                in_string = true;
                minified.push(ch);
            }
            _ => minified.push(ch),
        }
    }

    minified
}

/// Format a UTC instant as `yyyyMMddHHmmss` followed by four digits of
/// ten-thousandths of a second
pub fn correlation_timestamp(now: DateTime<Utc>) -> String {
    // leap seconds report nanos past 1e9
    let ticks = (now.timestamp_subsec_nanos() / 100_000).min(9_999);
    format!("{}{:04}", now.format("%Y%m%d%H%M%S"), ticks)
}
