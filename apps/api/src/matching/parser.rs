//! Response Parser — extracts a validated match percentage from raw,
//! untrusted oracle output.
//!
//! The oracle is instructed to answer with a bare JSON object, but in
//! practice models wrap the payload in prose, markdown fences, or both. The
//! parser scans for the first balanced `{...}` span, decodes it strictly, and
//! rejects anything that is not an integral number in [0, 100]. No clamping,
//! no defaults: a malformed score silently coerced to 0 or 50 would corrupt
//! the ranking, while a rejection only costs one posting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in oracle response")]
    NoJsonObject,

    #[error("oracle response contained malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("oracle response has no match_percentage field")]
    MissingField,

    #[error("match_percentage is not an integer: {0}")]
    NotAnInteger(String),

    #[error("match_percentage {0} is outside 0-100")]
    OutOfRange(i64),
}

/// Parses one raw oracle response into a match percentage.
///
/// When the response contains several JSON-like objects, the first
/// well-formed one wins; later candidates are never consulted.
pub fn parse_match_percentage(raw: &str) -> Result<u8, ParseError> {
    let span = first_balanced_object(raw).ok_or(ParseError::NoJsonObject)?;
    let value: serde_json::Value = serde_json::from_str(span)?;

    let field = value
        .get("match_percentage")
        .or_else(|| value.get("matchPercentage"))
        .ok_or(ParseError::MissingField)?;

    let score = as_integer(field)?;

    if !(0..=100).contains(&score) {
        return Err(ParseError::OutOfRange(score));
    }

    Ok(score as u8)
}

/// Accepts JSON integers and integral floats (`73` and `73.0` are the same
/// number in JSON); rejects everything else, including `73.4` and `"73"`.
fn as_integer(field: &serde_json::Value) -> Result<i64, ParseError> {
    if let Some(n) = field.as_i64() {
        return Ok(n);
    }
    if let Some(f) = field.as_f64() {
        if f.fract() == 0.0 && f.is_finite() {
            return Ok(f as i64);
        }
    }
    Err(ParseError::NotAnInteger(field.to_string()))
}

/// Returns the first balanced `{...}` span in `raw`, or `None`.
///
/// Brace counting is string- and escape-aware so braces inside JSON string
/// values do not unbalance the scan.
fn first_balanced_object(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let start = raw.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
