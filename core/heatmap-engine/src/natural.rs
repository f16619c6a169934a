//! FILENAME: core/heatmap-engine/src/natural.rs
//! Natural ordering for dimension labels.
//!
//! Pivot keys are frequently numeric strings (status codes, hours, ports),
//! so plain lexical order puts "100" before "50". Labels are split into digit
//! and non-digit runs; digit runs compare by value, text runs compare
//! case-insensitively. Remaining ties fall back to leading-zero count and
//! then exact text, so the order is total.

use std::cmp::Ordering;

/// A maximal run of digits or non-digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits { Chunk::Digits(chunk) } else { Chunk::Text(chunk) })
    }
}

fn chunks(s: &str) -> Chunks<'_> {
    Chunks { rest: s }
}

/// Compares two digit runs by numeric value without parsing,
/// so arbitrarily long runs never overflow.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
}

fn compare_text_folded(a: &str, b: &str) -> Ordering {
    let a_lower = a.chars().flat_map(char::to_lowercase);
    let b_lower = b.chars().flat_map(char::to_lowercase);
    a_lower.cmp(b_lower)
}

/// Natural comparison of two labels.
///
/// `"50" < "100" < "304"`, `"item2" < "item10"`, `"apple" < "Banana"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    // Secondary differences (leading zeros, letter case) only decide when
    // everything else is equal.
    let mut tie = Ordering::Equal;
    let mut left = chunks(a);
    let mut right = chunks(b);

    loop {
        let (l, r) = match (left.next(), right.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => (l, r),
        };

        let primary = match (l, r) {
            (Chunk::Digits(x), Chunk::Digits(y)) => {
                let ord = compare_digits(x, y);
                if ord == Ordering::Equal && tie == Ordering::Equal {
                    // "01" vs "1": fewer leading zeros first
                    tie = x.len().cmp(&y.len());
                }
                ord
            }
            // Digits sort before text at the same position.
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
            (Chunk::Text(x), Chunk::Text(y)) => {
                let ord = compare_text_folded(x, y);
                if ord == Ordering::Equal && tie == Ordering::Equal {
                    tie = x.cmp(y);
                }
                ord
            }
        };

        if primary != Ordering::Equal {
            return primary;
        }
    }

    tie
}
