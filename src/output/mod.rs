use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::cli::Cli;
use crate::util::json::{save_json_output, to_json_string, JsonStyle};

pub mod account;
pub mod cert;
pub mod democracy;
pub mod node;
pub mod progress;
pub mod tx;
pub mod validation;

/// Convert a string into a tree label.
fn tree_label<S: Into<String>>(s: S) -> String {
    s.into()
}

/// Where command results go: a tree or JSON on stdout, plus an optional file.
#[derive(Clone, Debug, Default)]
pub struct OutputTarget {
    pub json: bool,
    pub no_stdout: bool,
    pub path: Option<PathBuf>,
}

impl OutputTarget {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json: cli.json,
            no_stdout: cli.no_stdout,
            path: cli.output.clone(),
        }
    }

    /// Print `data` with `render` (or as JSON) and save it when `--output` is set.
    pub fn emit<T: Serialize>(&self, data: &T, render: impl FnOnce(&T)) -> Result<()> {
        if !self.no_stdout {
            if self.json {
                println!("{}", to_json_string(data, JsonStyle::Pretty)?);
            } else {
                render(data);
            }
        }
        if let Some(path) = &self.path {
            match save_json_output(data, path, JsonStyle::Pretty) {
                Ok(_) => {
                    if !self.no_stdout {
                        tracing::info!("JSON output saved to {}", path.display());
                    }
                }
                Err(e) => tracing::error!("Failed to save JSON output: {}", e),
            }
        }
        Ok(())
    }
}
