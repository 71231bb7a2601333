//! PlantUML rendering.
//!
//! Layout of the document:
//!
//! ```text
//! @startuml
//!
//! object db1.example.com {
//!   "role": "primary"
//! }
//! object web1
//!
//! package db {
//!   db_hosts - db1.example.com
//!   class db_vars
//! }
//! class db_vars {
//!   "port": 5432
//! }
//! package prod {
//!   prod_children - db
//! }
//!
//! @enduml
//! ```
//!
//! Hosts come from `_meta.hostvars`; groups are rendered in document order.

use invsync_core::{CanonicalInventory, GroupEntry, VariableMap};
use serde_json::Value;

use crate::annotation::annotate;
use crate::error::DiagramError;
use crate::sanitize::{sanitize_group_name, sanitize_host_name};

const START: &str = "@startuml\n\n";
const END: &str = "\n@enduml";

/// Render `inventory` as a PlantUML document. Pure and deterministic.
pub fn render_plantuml(inventory: &CanonicalInventory) -> Result<String, DiagramError> {
    let hosts = render_hosts(inventory)?;
    let mut groups = String::new();
    for (name, entry) in inventory.groups() {
        render_group(&mut groups, name, &entry)?;
    }

    tracing::debug!(
        hosts = inventory.hostvars().map_or(0, VariableMap::len),
        groups = inventory.group_names().count(),
        "rendered plantuml"
    );
    Ok(format!("{START}{hosts}\n{groups}{END}"))
}

fn render_hosts(inventory: &CanonicalInventory) -> Result<String, DiagramError> {
    let mut out = String::new();
    let Some(hostvars) = inventory.hostvars() else {
        return Ok(out);
    };

    for (host, vars) in hostvars {
        out.push_str("object ");
        out.push_str(&sanitize_host_name(host));
        if has_content(vars) {
            out.push(' ');
            out.push_str(&annotate(host, vars)?);
        }
        out.push('\n');
    }
    Ok(out)
}

fn render_group(out: &mut String, name: &str, entry: &GroupEntry) -> Result<(), DiagramError> {
    let id = sanitize_group_name(name);
    let mut vars_class = None;

    out.push_str(&format!("package {id} {{\n"));
    for host in entry.hosts.iter().flatten() {
        out.push_str(&format!("  {id}_hosts - {}\n", sanitize_host_name(host)));
    }
    if let Some(vars) = &entry.vars {
        out.push_str(&format!("  class {id}_vars\n"));
        vars_class = Some(format!("class {id}_vars {}\n", annotate(name, vars)?));
    }
    for child in entry.children.iter().flatten() {
        out.push_str(&format!("  {id}_children - {}\n", sanitize_group_name(child)));
    }
    out.push_str("}\n");

    if let Some(class) = vars_class {
        out.push_str(&class);
    }
    Ok(())
}

/// Nulls and empty mappings get no annotation.
fn has_content(vars: &Value) -> bool {
    match vars {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
