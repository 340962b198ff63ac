//! Dice and numeric-input primitives.

use rand::{Rng, RngCore};

/// Uniform roll in `[1, sides]`.
pub fn roll_die(rng: &mut dyn RngCore, sides: i64) -> i64 {
    if sides <= 1 {
        return 1;
    }
    rng.random_range(1..=sides)
}

/// Uniform integer between `min(a, b)` and `max(a, b)` inclusive.
pub fn random_int_in_range(rng: &mut dyn RngCore, a: i64, b: i64) -> i64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    rng.random_range(lo..=hi)
}

/// Coerce free-text numeric input to a clamped integer. Non-numeric input
/// degrades to 0 before clamping; this system favors silent normalization
/// over hard failure for user-entered numbers.
pub fn clamp_int(value: &str, min: i64, max: Option<i64>) -> i64 {
    let n = parse_leading_int(value).unwrap_or(0);
    let n = n.max(min);
    match max {
        Some(max) => n.min(max),
        None => n,
    }
}

/// Parse a leading integer the way the tracker's text inputs do: optional
/// sign, digits, trailing junk ignored ("1,500 gp" -> 1500).
fn parse_leading_int(value: &str) -> Option<i64> {
    let cleaned = value.trim().replace(',', "");
    let mut chars = cleaned.chars().peekable();
    let mut out = String::new();
    if let Some(&c) = chars.peek() {
        if c == '-' || c == '+' {
            out.push(c);
            chars.next();
        }
    }
    for c in chars {
        if c.is_ascii_digit() {
            out.push(c);
        } else {
            break;
        }
    }
    out.parse().ok()
}
