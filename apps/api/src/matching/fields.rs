//! Tolerant field coalescing for loosely-typed profile documents.
//!
//! Upstream records were written by several client versions and never
//! migrated, so the same logical field appears under different keys. Each
//! call site lists its known key variants in preference order; the first
//! non-blank string wins.

use serde_json::Value;

/// Returns the first non-blank string value among `keys`, trimmed.
pub(crate) fn coalesce_str(doc: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = doc.get(key).and_then(Value::as_str) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Like `coalesce_str`, but also accepts numeric ids and stringifies them.
/// Keys are walked once in preference order: a numeric id at a
/// higher-priority key beats a string at a lower-priority one.
pub(crate) fn coalesce_id(doc: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match doc.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return Some(s.trim().to_string());
            }
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Some(i.to_string());
                }
            }
            _ => {}
        }
    }
    None
}
