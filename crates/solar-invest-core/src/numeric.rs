//! Numeric coercion, clamping and display formatting.
//!
//! Engine arithmetic is `Decimal`. The only `f64` values are the IRR
//! bisection and the jitter draw; `to_f64`/`from_f64` are the crossing points.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::str::FromStr;

const COMPACT_SUFFIXES: [(Decimal, &str); 3] = [
    (dec!(1_000_000_000), "B"),
    (dec!(1_000_000), "M"),
    (dec!(1_000), "k"),
];

/// Parse free-form numeric text, returning `fallback` when it is not a number.
///
/// Whitespace and underscores are ignored. When the text contains a `.`, any
/// `,` is a thousands separator; a single `,` without a `.` is read as the
/// decimal separator. Scientific notation (`2.2e7`) is accepted.
pub fn coerce_number(text: &str, fallback: Decimal) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return fallback;
    }

    let normalized = if cleaned.contains('.') || cleaned.matches(',').count() > 1 {
        cleaned.replace(',', "")
    } else {
        cleaned.replace(',', ".")
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .unwrap_or(fallback)
}

/// Like [`coerce_number`], but a trailing `%` divides the value by 100.
pub fn coerce_rate(text: &str, fallback: Decimal) -> Decimal {
    let trimmed = text.trim();
    match trimmed.strip_suffix('%') {
        Some(pct) => {
            let cleaned = pct.trim();
            if cleaned.is_empty() {
                return fallback;
            }
            match Decimal::from_str(cleaned).or_else(|_| Decimal::from_scientific(cleaned)) {
                Ok(v) => v / dec!(100),
                Err(_) => fallback,
            }
        }
        None => coerce_number(trimmed, fallback),
    }
}

/// Clamp into `[lo, hi]`. A reversed range collapses to `lo`.
pub fn clamp(value: Decimal, lo: Decimal, hi: Decimal) -> Decimal {
    value.min(hi).max(lo)
}

/// Integer counterpart of [`clamp`].
pub fn clamp_int(value: u32, lo: u32, hi: u32) -> u32 {
    value.min(hi).max(lo)
}

/// `numerator / denominator`, or `None` when the denominator is zero or the
/// quotient overflows.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

/// `base^n` by repeated multiplication. Saturates at `Decimal::MAX`.
pub fn powi(base: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(base).unwrap_or(Decimal::MAX);
    }
    result
}

/// Lossy conversion for the `f64` boundary.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Convert an `f64` back into the engine, using `fallback` for NaN,
/// infinities and values outside the decimal range.
pub fn from_f64(value: f64, fallback: Decimal) -> Decimal {
    Decimal::from_f64(value).unwrap_or(fallback)
}

/// Round half away from zero to `dp` decimal places.
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a ratio as a percentage: `0.1234` with `dp = 2` gives `"12.34%"`.
pub fn format_pct(ratio: Decimal, dp: u32) -> String {
    match ratio.checked_mul(dec!(100)) {
        Some(pct) => format!("{:.prec$}%", round_dp(pct, dp), prec = dp as usize),
        None => "n/a".to_string(),
    }
}

/// Short human form of a large amount: `22_000_000` → `"22.0M"`,
/// `-1500` → `"-1.5k"`, `850` → `"850"`.
pub fn format_compact(value: Decimal) -> String {
    let abs = value.abs();
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };

    for (i, (scale, suffix)) in COMPACT_SUFFIXES.iter().enumerate() {
        if abs < *scale {
            continue;
        }
        let scaled = round_dp(abs / scale, 1);
        // 999_960 rounds to 1000.0k; promote it to the next suffix.
        if scaled >= dec!(1000) && i > 0 {
            let (bigger, bigger_suffix) = COMPACT_SUFFIXES[i - 1];
            return format!("{sign}{:.1}{bigger_suffix}", round_dp(abs / bigger, 1));
        }
        return format!("{sign}{scaled:.1}{suffix}");
    }

    format!("{sign}{}", round_dp(abs, 2).normalize())
}
