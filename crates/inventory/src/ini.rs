//! Ansible INI inventory format.
//!
//! ```text
//! loose.example.com
//!
//! [web]
//! web[01:02].example.com http_port=8080
//! db.example.com:2222 ansible_user="deploy user"
//!
//! [web:vars]
//! ntp_server = ntp.example.com
//!
//! [prod:children]
//! web
//! ```

use serde_json::Value;

use crate::error::{StaticResult, StaticSourceError};
use crate::model::{StaticInventory, UNGROUPED_GROUP};
use crate::pattern::expand_hosts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Hosts,
    Vars,
    Children,
}

/// Parse INI inventory text into `inventory`.
///
/// `inventory` is not reconciled; callers do that once all sources are read.
pub fn parse_ini(text: &str, inventory: &mut StaticInventory) -> StaticResult<()> {
    let mut group = UNGROUPED_GROUP.to_string();
    let mut section = Section::Hosts;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') {
            let (name, kind) = parse_header(line).map_err(|m| StaticSourceError::ini(line_no, m))?;
            if kind == Section::Hosts || kind == Section::Children {
                inventory.add_group(&name);
            }
            group = name;
            section = kind;
            continue;
        }

        match section {
            Section::Hosts => parse_host_line(line, &group, inventory)
                .map_err(|e| match e {
                    StaticSourceError::Ini { message, .. } => StaticSourceError::ini(line_no, message),
                    other => other,
                })?,
            Section::Vars => {
                let (key, value) = parse_assignment(line).map_err(|m| StaticSourceError::ini(line_no, m))?;
                inventory.set_group_var(&group, key, value);
            }
            Section::Children => {
                let tokens = tokenize(line).map_err(|m| StaticSourceError::ini(line_no, m))?;
                if let Some(child) = tokens.first() {
                    inventory.add_child(&group, child)?;
                }
            }
        }
    }
    Ok(())
}

fn parse_header(line: &str) -> Result<(String, Section), String> {
    let close = line
        .find(']')
        .ok_or_else(|| format!("unterminated section header `{line}`"))?;
    let rest = line[close + 1..].trim();
    if !(rest.is_empty() || rest.starts_with('#') || rest.starts_with(';')) {
        return Err(format!("unexpected text after section header `{line}`"));
    }

    let inner = line[1..close].trim();
    let (name, suffix) = match inner.split_once(':') {
        Some((name, suffix)) => (name.trim(), Some(suffix.trim())),
        None => (inner, None),
    };
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(format!("invalid group name in `{line}`"));
    }

    let kind = match suffix {
        None => Section::Hosts,
        Some("vars") => Section::Vars,
        Some("children") => Section::Children,
        Some(other) => return Err(format!("invalid section type `{other}` in `{line}`")),
    };
    Ok((name.to_string(), kind))
}

fn parse_host_line(line: &str, group: &str, inventory: &mut StaticInventory) -> StaticResult<()> {
    let tokens = tokenize(line).map_err(|m| StaticSourceError::ini(0, m))?;
    let Some((pattern, assignments)) = tokens.split_first() else {
        return Ok(());
    };

    let (pattern, port) = split_port(pattern);
    let mut vars = Vec::with_capacity(assignments.len() + 1);
    if let Some(port) = port {
        vars.push(("ansible_port".to_string(), Value::from(port)));
    }
    for assignment in assignments {
        vars.push(parse_assignment(assignment).map_err(|m| StaticSourceError::ini(0, m))?);
    }

    for host in expand_hosts(pattern)? {
        inventory.add_host(group, &host);
        for (key, value) in &vars {
            inventory.set_host_var(&host, key.clone(), value.clone());
        }
    }
    Ok(())
}

/// `host:port` → (`host`, port). IPv6 literals and bare names have no port.
///
/// Only the text after the last `]` can hold the port, so ranges such as
/// `web[01:02]` and bracketed addresses keep their colons.
fn split_port(pattern: &str) -> (&str, Option<u16>) {
    let tail_start = pattern.rfind(']').map_or(0, |close| close + 1);
    let Some(offset) = pattern[tail_start..].rfind(':') else {
        return (pattern, None);
    };
    let (host, port) = pattern.split_at(tail_start + offset);
    if host.is_empty() || (tail_start == 0 && host.contains(':')) {
        return (pattern, None);
    }
    match port[1..].parse() {
        Ok(port) => (host, Some(port)),
        Err(_) => (pattern, None),
    }
}

fn parse_assignment(text: &str) -> Result<(String, Value), String> {
    let (key, raw) = text
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, found `{text}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing variable name in `{text}`"));
    }
    Ok((key.to_string(), parse_value(raw.trim())))
}

/// Interpret an INI value the way inventory literals are read.
pub fn parse_value(raw: &str) -> Value {
    if let Some(inner) = unquote(raw) {
        return Value::String(inner.to_string());
    }
    match raw {
        "True" | "true" => return Value::Bool(true),
        "False" | "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    let numeric = !raw.is_empty()
        && raw.chars().any(|c| c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if numeric {
        if let Some(number) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(number);
        }
    }
    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

fn unquote(raw: &str) -> Option<&str> {
    let first = raw.chars().next()?;
    if (first == '"' || first == '\'') && raw.len() >= 2 && raw.ends_with(first) {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

/// Split on whitespace, keeping quoted runs together (quotes are kept in the
/// token). An unquoted `#` at the start of a token ends the line.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None if c == '#' && current.is_empty() => break,
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                current.push(c);
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote in `{line}`"));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}
