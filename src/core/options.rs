use std::path::PathBuf;

use crate::{Error, Result};

pub const DEFAULT_CONFIGURATION: &str = "Release";

/// The operator's build target selector, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ShipOptions {
    pub workspace: Option<String>,
    pub project: Option<String>,
    pub scheme: String,
    pub configuration: String,
    pub upload: bool,
    pub archive: bool,
    pub verbose: bool,
}

impl ShipOptions {
    /// Normalize and validate the selector.
    ///
    /// Contradictory or missing workspace/project input fails before any
    /// file is touched. Paths get their expected extension appended when
    /// absent (idempotent), the configuration falls back to "Release", and
    /// the root path must exist on disk.
    pub fn validate(&mut self) -> Result<()> {
        match (&self.workspace, &self.project) {
            (None, None) => {
                return Err(Error::config(
                    "Please provide either a workspace or a project",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "Please provide a workspace OR a project, not both",
                ))
            }
            _ => {}
        }

        if self.scheme.is_empty() {
            return Err(Error::config(
                "Missing option: a workspace or project is required, as well as a scheme",
            ));
        }

        if let Some(workspace) = self.workspace.as_mut() {
            ensure_extension(workspace, "xcworkspace");
        }
        if let Some(project) = self.project.as_mut() {
            ensure_extension(project, "xcodeproj");
        }

        if self.configuration.is_empty() {
            self.configuration = DEFAULT_CONFIGURATION.to_string();
        }

        let root = self.root_path();
        if !root.exists() {
            return Err(Error::config(format!(
                "Unable to find file: {}",
                root.display()
            )));
        }

        Ok(())
    }

    /// The workspace or project path, whichever was given.
    pub fn root_path(&self) -> PathBuf {
        let raw = self
            .workspace
            .as_deref()
            .or(self.project.as_deref())
            .unwrap_or_default();
        PathBuf::from(raw)
    }
}

fn ensure_extension(path: &mut String, extension: &str) {
    let suffix = format!(".{}", extension);
    if !path.ends_with(&suffix) {
        path.push_str(&suffix);
    }
}
