//! Escaping of daemon values for the host's string-expansion syntax.
//!
//! `$` and `\` are the only characters the expander interprets, so each gets a
//! single `\` in front. Nothing else is touched, trailing newlines included.

use pwmd_common::{LookupError, LookupResult};

/// Escapes `$` and `\` in `raw`.
///
/// The output is reserved at twice the input length up front, so the loop
/// never reallocates.
///
/// # Errors
/// Returns `LookupError::EscapeAlloc` if the buffer cannot be reserved.
pub fn escape_value(raw: &str) -> LookupResult<String> {
    let len = raw.len().checked_mul(2).ok_or(LookupError::EscapeAlloc {
        len: usize::MAX,
        source: None,
    })?;

    let mut escaped = String::new();
    escaped
        .try_reserve_exact(len)
        .map_err(|source| LookupError::EscapeAlloc {
            len,
            source: Some(source),
        })?;

    for ch in raw.chars() {
        if matches!(ch, '$' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Ok(escaped)
}
