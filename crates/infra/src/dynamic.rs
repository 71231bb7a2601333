//! Dynamic inventory scripts.
//!
//! A script is run as `<program> --list` and must print one JSON inventory
//! document on stdout. Any failure is fatal; there is no fallback to an empty
//! inventory once a script is configured.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use invsync_core::{CanonicalInventory, InventoryError};
use thiserror::Error;

/// Flag that asks a dynamic inventory script for the full inventory.
pub const LIST_FLAG: &str = "--list";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}: {stderr}", program.display())]
    Exit {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("{} printed invalid JSON: {source}", program.display())]
    Parse {
        program: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} printed an unusable inventory: {source}", program.display())]
    Shape {
        program: PathBuf,
        #[source]
        source: InventoryError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicInventoryScript {
    program: PathBuf,
}

impl DynamicInventoryScript {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the script and parse its output.
    pub fn fetch(&self) -> Result<CanonicalInventory, FetchError> {
        tracing::debug!(program = %self.program.display(), "running dynamic inventory");
        let output = Command::new(&self.program)
            .arg(LIST_FLAG)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::Exit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let document: serde_json::Value =
            serde_json::from_slice(&output.stdout).map_err(|source| FetchError::Parse {
                program: self.program.clone(),
                source,
            })?;
        let inventory =
            CanonicalInventory::from_value(document).map_err(|source| FetchError::Shape {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!(
            program = %self.program.display(),
            groups = inventory.group_names().count(),
            "dynamic inventory fetched"
        );
        Ok(inventory)
    }
}

/// Fetch from `program`, or return an empty inventory when none is configured.
pub fn fetch_dynamic_inventory(program: Option<&Path>) -> Result<CanonicalInventory, FetchError> {
    match program {
        Some(program) => DynamicInventoryScript::new(program).fetch(),
        None => Ok(CanonicalInventory::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_program_means_empty_inventory() {
        let inventory = fetch_dynamic_inventory(None).unwrap();
        assert!(inventory.is_empty());
        assert!(inventory.hostvars().is_none());
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = fetch_dynamic_inventory(Some(Path::new("/no/such/inventory.py"))).unwrap_err();
        assert!(matches!(err, FetchError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod scripts {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("inventory.sh");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn parses_list_output() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(
                &dir,
                r#"[ "$1" = "--list" ] || exit 3
echo '{"db": {"vars": {"role": "primary"}}, "web": ["w1", "w2"], "_meta": {"hostvars": {}}}'"#,
            );

            let inventory = fetch_dynamic_inventory(Some(&path)).unwrap();

            assert_eq!(
                inventory.into_value(),
                json!({
                    "db": {"vars": {"role": "primary"}},
                    "web": {"hosts": ["w1", "w2"]},
                    "_meta": {"hostvars": {}}
                })
            );
        }

        #[test]
        fn nonzero_exit_is_fatal() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(&dir, "echo 'cloud api down' >&2\nexit 2");

            match fetch_dynamic_inventory(Some(&path)).unwrap_err() {
                FetchError::Exit { stderr, .. } => assert_eq!(stderr, "cloud api down"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn malformed_output_is_fatal() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(&dir, "echo 'not json'");

            assert!(matches!(
                fetch_dynamic_inventory(Some(&path)).unwrap_err(),
                FetchError::Parse { .. }
            ));
        }

        #[test]
        fn non_mapping_output_is_fatal() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(&dir, "echo '[1, 2]'");

            assert!(matches!(
                fetch_dynamic_inventory(Some(&path)).unwrap_err(),
                FetchError::Shape { .. }
            ));
        }
    }
}
