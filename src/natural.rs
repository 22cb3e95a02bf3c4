//! Natural ordering of file and directory names
//!
//! Names are compared by the integers embedded in them rather than
//! character by character, so `2 - Intro` sorts before `10 - Outro`
//! even without leading zeros. Names without digits fall back to plain
//! string comparison.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

fn digit_run() -> &'static Regex {
    DIGIT_RUN.get_or_init(|| Regex::new(r"[0-9]+").unwrap())
}

/// Extract every maximal run of decimal digits as an integer, left to right
///
/// Runs too large for `u64` saturate at `u64::MAX`.
pub fn extract_numbers(s: &str) -> Vec<u64> {
    digit_run()
        .find_iter(s)
        .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
        .collect()
}

/// Compare two number sequences with string semantics
///
/// An empty sequence is less than any non-empty one. Otherwise elements
/// are compared pairwise; when one sequence is a prefix of the other,
/// the shorter one is less.
pub fn compare_number_sequences(a: &[u64], b: &[u64]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Compare two names naturally
///
/// When both names carry numbers only the number sequences decide the
/// order; the surrounding text is ignored.
pub fn natural_compare(x: &str, y: &str) -> Ordering {
    let a = extract_numbers(x);
    let b = extract_numbers(y);
    if !a.is_empty() && !b.is_empty() {
        compare_number_sequences(&a, &b)
    } else {
        x.cmp(y)
    }
}
