//! Diagram identifiers.
//!
//! PlantUML identifiers are restricted, so names are rewritten before use.
//! Groups and hosts use different character sets: host identifiers keep dots.

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_group_name(name: &str) -> String {
    replace_disallowed(name, |c| c.is_ascii_alphanumeric() || c == '_')
}

/// Replace every character outside `[A-Za-z0-9_.]` with `_`.
pub fn sanitize_host_name(name: &str) -> String {
    replace_disallowed(name, |c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn replace_disallowed(name: &str, allowed: impl Fn(char) -> bool) -> String {
    name.chars()
        .map(|c| if allowed(c) { c } else { '_' })
        .collect()
}
