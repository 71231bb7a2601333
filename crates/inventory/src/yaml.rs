//! Ansible YAML inventory format.
//!
//! ```yaml
//! all:
//!   vars:
//!     ntp_server: ntp.example.com
//!   children:
//!     web:
//!       hosts:
//!         web[01:02].example.com:
//!           http_port: 8080
//!     db:
//!       hosts:
//!         db.example.com:
//! ```
//!
//! JSON documents of the same shape are accepted too.

use serde_json::Value;

use crate::error::{StaticResult, StaticSourceError};
use crate::model::StaticInventory;
use crate::pattern::expand_hosts;

/// Parse YAML (or JSON) inventory text into `inventory`.
///
/// `inventory` is not reconciled; callers do that once all sources are read.
pub fn parse_yaml(text: &str, inventory: &mut StaticInventory) -> StaticResult<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let document: Value = serde_yaml::from_str(text)?;
    match document {
        Value::Null => Ok(()),
        Value::Object(groups) => {
            for (name, body) in &groups {
                parse_group(name, body, inventory)?;
            }
            Ok(())
        }
        _ => Err(StaticSourceError::shape(
            "top level must be a mapping of group names",
        )),
    }
}

fn parse_group(name: &str, body: &Value, inventory: &mut StaticInventory) -> StaticResult<()> {
    inventory.add_group(name);
    let body = match body {
        Value::Null => return Ok(()),
        Value::Object(body) => body,
        _ => {
            return Err(StaticSourceError::shape(format!(
                "group `{name}` must be a mapping"
            )));
        }
    };

    for (key, value) in body {
        match key.as_str() {
            "hosts" => parse_hosts(name, value, inventory)?,
            "vars" => match value {
                Value::Null => {}
                Value::Object(vars) => {
                    for (var, val) in vars {
                        inventory.set_group_var(name, var.clone(), val.clone());
                    }
                }
                _ => {
                    return Err(StaticSourceError::shape(format!(
                        "vars of group `{name}` must be a mapping"
                    )));
                }
            },
            "children" => match value {
                Value::Null => {}
                Value::Object(children) => {
                    for (child, child_body) in children {
                        parse_group(child, child_body, inventory)?;
                        inventory.add_child(name, child)?;
                    }
                }
                _ => {
                    return Err(StaticSourceError::shape(format!(
                        "children of group `{name}` must be a mapping"
                    )));
                }
            },
            other => {
                tracing::warn!(group = name, key = other, "skipping unexpected key in YAML inventory");
            }
        }
    }
    Ok(())
}

fn parse_hosts(group: &str, hosts: &Value, inventory: &mut StaticInventory) -> StaticResult<()> {
    let hosts = match hosts {
        Value::Null => return Ok(()),
        Value::Object(hosts) => hosts,
        _ => {
            return Err(StaticSourceError::shape(format!(
                "hosts of group `{group}` must be a mapping"
            )));
        }
    };

    for (pattern, vars) in hosts {
        let vars = match vars {
            Value::Null => None,
            Value::Object(vars) => Some(vars),
            _ => {
                return Err(StaticSourceError::shape(format!(
                    "variables of host `{pattern}` must be a mapping"
                )));
            }
        };
        for host in expand_hosts(pattern)? {
            inventory.add_host(group, &host);
            for (key, value) in vars.into_iter().flatten() {
                inventory.set_host_var(&host, key.clone(), value.clone());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ALL_GROUP;
    use serde_json::json;

    fn parse(text: &str) -> StaticInventory {
        let mut inv = StaticInventory::new();
        parse_yaml(text, &mut inv).unwrap();
        inv.reconcile();
        inv
    }

    fn names(items: &[String]) -> Vec<&str> {
        items.iter().map(String::as_str).collect()
    }

    #[test]
    fn nested_groups_hosts_and_vars() {
        let inv = parse(
            r#"
all:
  vars:
    ntp_server: ntp.example.com
  children:
    web:
      hosts:
        web[01:02].example.com:
          http_port: 8080
    db:
      hosts:
        db.example.com:
"#,
        );

        assert_eq!(names(inv.group(ALL_GROUP).unwrap().children()), ["ungrouped", "web", "db"]);
        assert_eq!(
            inv.group(ALL_GROUP).unwrap().vars()["ntp_server"],
            json!("ntp.example.com")
        );
        assert_eq!(
            names(inv.group("web").unwrap().hosts()),
            ["web01.example.com", "web02.example.com"]
        );
        assert_eq!(
            inv.host("web01.example.com").unwrap().vars()["http_port"],
            json!(8080)
        );
        assert!(inv.host("db.example.com").unwrap().vars().is_empty());
    }

    #[test]
    fn hosts_directly_under_all_become_ungrouped() {
        let inv = parse("all:\n  hosts:\n    loose:\n");
        assert_eq!(names(inv.group("ungrouped").unwrap().hosts()), ["loose"]);
        assert_eq!(names(inv.group(ALL_GROUP).unwrap().hosts()), ["loose"]);
    }

    #[test]
    fn json_documents_are_accepted() {
        let inv = parse(r#"{"web": {"hosts": {"w1": {"port": 80}}}}"#);
        assert_eq!(inv.host("w1").unwrap().vars()["port"], json!(80));
    }

    #[test]
    fn empty_document_is_an_empty_inventory() {
        let inv = parse("");
        assert_eq!(inv.hosts().count(), 0);
    }

    #[test]
    fn list_of_hosts_is_rejected() {
        let mut inv = StaticInventory::new();
        let err = parse_yaml("web:\n  hosts: [a, b]\n", &mut inv).unwrap_err();
        assert!(matches!(err, StaticSourceError::Shape(_)));
    }

    #[test]
    fn top_level_sequence_is_rejected() {
        let mut inv = StaticInventory::new();
        assert!(matches!(
            parse_yaml("- web\n", &mut inv),
            Err(StaticSourceError::Shape(_))
        ));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let mut inv = StaticInventory::new();
        assert!(matches!(
            parse_yaml("web: [unclosed\n", &mut inv),
            Err(StaticSourceError::Yaml(_))
        ));
    }
}
