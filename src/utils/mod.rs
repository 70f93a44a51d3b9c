//! Common utilities and helper functions
//!
//! This module provides shared formatting helpers used by reports.

use crate::analytics::checked_delta;

/// Format an integer with thousands separators
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Format a delta with an explicit sign and thousands separators
pub fn format_signed(delta: i64) -> String {
    let magnitude = format_count(delta.unsigned_abs());
    match delta.signum() {
        1 => format!("+{magnitude}"),
        -1 => format!("-{magnitude}"),
        _ => magnitude,
    }
}

/// Format `current - previous` like [`format_signed`], or `n/a` when the
/// difference does not fit in an `i64`
pub fn format_delta(current: u64, previous: u64) -> String {
    checked_delta(current, previous).map_or_else(|| String::from("n/a"), format_signed)
}

/// Truncate text to a maximum length
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
