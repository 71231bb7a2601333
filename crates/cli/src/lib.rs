//! `invsync` command line: Ansible dynamic-inventory protocol on top of the
//! reconciliation pipeline.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use invsync_core::CanonicalInventory;
use invsync_infra::{ConfigLocator, InventoryPipeline};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(author, version, about = "Merge static and dynamic Ansible inventories")]
pub struct Cli {
    /// Print the merged inventory (the default)
    #[arg(long, conflicts_with_all = ["host", "plantuml"])]
    pub list: bool,

    /// Print the variables of one host
    #[arg(long, value_name = "NAME", conflicts_with = "plantuml")]
    pub host: Option<String>,

    /// Print a PlantUML diagram of the merged inventory
    #[arg(long)]
    pub plantuml: bool,

    /// Config file; searched for when omitted
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    List,
    Host(String),
    PlantUml,
}

impl Cli {
    fn mode(&self) -> Mode {
        match (&self.host, self.plantuml) {
            (Some(host), _) => Mode::Host(host.clone()),
            (None, true) => Mode::PlantUml,
            (None, false) => Mode::List,
        }
    }
}

/// Resolve the config, run the pipeline, and render the requested output.
pub fn execute(cli: &Cli) -> Result<String> {
    let path = ConfigLocator::from_env().locate(cli.config.as_deref())?;
    let inventory = InventoryPipeline::from_config_file(&path)
        .with_context(|| format!("Failed to build inventory from {}", path.display()))?
        .into_inventory();
    render(&inventory, &cli.mode(), cli.pretty)
}

/// Run and write the result to `--output` or stdout.
pub fn run(cli: &Cli) -> Result<()> {
    let rendered = execute(cli)?;
    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn render(inventory: &CanonicalInventory, mode: &Mode, pretty: bool) -> Result<String> {
    match mode {
        Mode::List => to_json(inventory.as_map(), pretty),
        Mode::Host(host) => {
            let vars = inventory.host_vars(host).cloned().unwrap_or_default();
            to_json(&vars, pretty)
        }
        Mode::PlantUml => Ok(invsync_diagram::render_plantuml(inventory)?),
    }
}

fn to_json(value: &serde_json::Map<String, Value>, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inventory() -> CanonicalInventory {
        CanonicalInventory::from_value(json!({
            "db": {"hosts": ["db1"]},
            "_meta": {"hostvars": {"db1": {"role": "primary"}}}
        }))
        .unwrap()
    }

    #[test]
    fn list_is_the_default_mode() {
        let cli = Cli::try_parse_from(["invsync"]).unwrap();
        assert_eq!(cli.mode(), Mode::List);
        let cli = Cli::try_parse_from(["invsync", "--list"]).unwrap();
        assert_eq!(cli.mode(), Mode::List);
    }

    #[test]
    fn modes_are_exclusive() {
        assert!(Cli::try_parse_from(["invsync", "--list", "--host", "db1"]).is_err());
        assert!(Cli::try_parse_from(["invsync", "--list", "--plantuml"]).is_err());
        assert!(Cli::try_parse_from(["invsync", "--host", "db1", "--plantuml"]).is_err());
    }

    #[test]
    fn host_mode_prints_that_hosts_vars() {
        let out = render(&inventory(), &Mode::Host("db1".into()), false).unwrap();
        assert_eq!(out, r#"{"role":"primary"}"#);
    }

    #[test]
    fn unknown_host_prints_empty_object() {
        let out = render(&inventory(), &Mode::Host("nope".into()), false).unwrap();
        assert_eq!(out, "{}");
    }

    #[test]
    fn list_mode_prints_whole_document() {
        let out = render(&inventory(), &Mode::List, false).unwrap();
        assert_eq!(
            out,
            r#"{"db":{"hosts":["db1"]},"_meta":{"hostvars":{"db1":{"role":"primary"}}}}"#
        );
        let pretty = render(&inventory(), &Mode::List, true).unwrap();
        assert!(pretty.starts_with("{\n  \"db\""));
    }

    #[test]
    fn plantuml_mode_renders_diagram() {
        let out = render(&inventory(), &Mode::PlantUml, false).unwrap();
        assert!(out.starts_with("@startuml"));
        assert!(out.contains("  db_hosts - db1\n"));
    }
}
