//! Value equivalence: decides whether two raw cell texts state the same fact.
//!
//! Exports of the same document disagree on encoding: one emits `★★★`, the
//! next emits `3`; one pads with spaces or leading zeros, the next doesn't.
//! Values that compare equal here never become modifications.

const FILLED_STAR: char = '★';
const EMPTY_STAR: char = '☆';

/// Interpretation of a raw cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonical {
    /// Star rating; the count of filled stars.
    Stars(u32),
    /// Plain decimal number with leading zeros stripped from the integer part.
    Number(String),
    /// Anything else, trimmed.
    Text(String),
}

pub fn canonical(raw: &str) -> Canonical {
    let s = raw.trim();
    if let Some(n) = star_rating(s) {
        return Canonical::Stars(n);
    }
    if let Some(num) = plain_number(s) {
        return Canonical::Number(num);
    }
    Canonical::Text(s.to_string())
}

/// True when `a` and `b` represent the same value.
pub fn equivalent(a: &str, b: &str) -> bool {
    // Fast path: identical after trimming.
    if a.trim() == b.trim() {
        return true;
    }
    match (canonical(a), canonical(b)) {
        (Canonical::Stars(x), Canonical::Stars(y)) => x == y,
        (Canonical::Stars(n), Canonical::Number(k)) | (Canonical::Number(k), Canonical::Stars(n)) => {
            k == n.to_string()
        }
        (Canonical::Number(x), Canonical::Number(y)) => x == y,
        (Canonical::Text(x), Canonical::Text(y)) => x == y,
        _ => false,
    }
}

fn star_rating(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c == FILLED_STAR || c == EMPTY_STAR) {
        return None;
    }
    Some(s.chars().filter(|&c| c == FILLED_STAR).count() as u32)
}

/// `007` → `7`, `3.50` → `3.50`, `0` → `0`. Signs, exponents and grouping
/// separators are not numbers here.
fn plain_number(s: &str) -> Option<String> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !digits(int_part) {
        return None;
    }
    if let Some(f) = frac_part {
        if !digits(f) {
            return None;
        }
    }
    let stripped = int_part.trim_start_matches('0');
    let int_norm = if stripped.is_empty() { "0" } else { stripped };
    Some(match frac_part {
        Some(f) => format!("{int_norm}.{f}"),
        None => int_norm.to_string(),
    })
}
