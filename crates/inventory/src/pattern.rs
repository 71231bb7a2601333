//! Host range patterns such as `web[01:03].example.com` or `db-[a:c]`.
//!
//! A range is `[start:end]` or `[start:end:stride]`. Numeric bounds with a
//! leading zero keep their width (`[01:10]` → `01`..`10`), which requires both
//! bounds to have the same length. Alphabetic ranges use single letters. Several
//! ranges in one pattern expand left to right.
//!
//! Brackets that do not look like a range (an IPv6 literal, say) are kept as-is.

use crate::error::{StaticResult, StaticSourceError};

/// Expand `pattern` into the host names it denotes.
pub fn expand_hosts(pattern: &str) -> StaticResult<Vec<String>> {
    let Some((head, range, tail)) = split_range(pattern) else {
        return Ok(vec![pattern.to_string()]);
    };

    let items = expand_range(pattern, range)?;
    let tails = expand_hosts(tail)?;

    let mut hosts = Vec::with_capacity(items.len() * tails.len());
    for item in &items {
        for rest in &tails {
            hosts.push(format!("{head}{item}{rest}"));
        }
    }
    Ok(hosts)
}

/// Split around the first bracketed range: `(head, inside, tail)`.
fn split_range(pattern: &str) -> Option<(&str, &str, &str)> {
    let open = pattern.find('[')?;
    let close = open + pattern[open..].find(']')?;
    let inside = &pattern[open + 1..close];

    let parts: Vec<&str> = inside.split(':').collect();
    let looks_like_range = (parts.len() == 2 || parts.len() == 3)
        && !parts[1].is_empty()
        && parts
            .iter()
            .all(|part| part.chars().all(|c| c.is_ascii_alphanumeric()));
    if !looks_like_range {
        return None;
    }
    Some((&pattern[..open], inside, &pattern[close + 1..]))
}

fn expand_range(pattern: &str, range: &str) -> StaticResult<Vec<String>> {
    let mut parts = range.split(':');
    let begin = parts.next().unwrap_or_default();
    let end = parts.next().unwrap_or_default();
    let stride = match parts.next() {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| StaticSourceError::pattern(pattern, "stride must be a positive integer"))?,
        None => 1,
    };

    let begin = if begin.is_empty() { "0" } else { begin };

    if let (Ok(first), Ok(last)) = (begin.parse::<u64>(), end.parse::<u64>()) {
        let width = if begin.len() > 1 && begin.starts_with('0') {
            if begin.len() != end.len() {
                return Err(StaticSourceError::pattern(
                    pattern,
                    "padded range bounds must have equal width",
                ));
            }
            begin.len()
        } else {
            0
        };
        if first > last {
            return Err(StaticSourceError::pattern(
                pattern,
                "range start is greater than range end",
            ));
        }
        return Ok((first..=last)
            .step_by(stride)
            .map(|n| format!("{n:0width$}"))
            .collect());
    }

    let (first, last) = match (single_letter(begin), single_letter(end)) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(StaticSourceError::pattern(
                pattern,
                "range bounds must both be numbers or single letters",
            ));
        }
    };
    if first > last {
        return Err(StaticSourceError::pattern(
            pattern,
            "range start is greater than range end",
        ));
    }
    Ok((first..=last)
        .step_by(stride)
        .map(|c| c.to_string())
        .collect())
}

fn single_letter(bound: &str) -> Option<char> {
    let mut chars = bound.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
        _ => None,
    }
}
