//! Workspace membership scanning.
//!
//! A workspace bundle lists its member projects in
//! `contents.xcworkspacedata`. Resolution picks the first member whose
//! shared-scheme directory contains the requested scheme. Workspaces hold
//! single-digit project counts, so a linear scan over projects is fine.

use std::fs;
use std::path::{Path, PathBuf};

use crate::log_status;
use crate::scheme;
use crate::{Error, Result};

/// Find the member project that shares `scheme_name`.
pub fn project_for_scheme(
    workspace_path: &Path,
    scheme_name: &str,
    verbose: bool,
) -> Result<PathBuf> {
    let contents_path = workspace_path.join("contents.xcworkspacedata");
    let text = fs::read_to_string(&contents_path).map_err(|_| {
        Error::resolve(format!(
            "Unable to read workspace contents at {}",
            contents_path.display()
        ))
    })?;

    let doc = roxmltree::Document::parse(&text)
        .map_err(|e| Error::resolve(format!("Malformed workspace contents: {}", e)))?;

    let workspace_dir = workspace_path.parent().unwrap_or(Path::new("."));

    for file_ref in doc.descendants().filter(|n| n.has_tag_name("FileRef")) {
        let Some(location) = file_ref.attribute("location") else {
            continue;
        };
        // Locations look like "group:App.xcodeproj" or "container:Sub/App.xcodeproj".
        let relative = location
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(location);
        if !relative.ends_with(".xcodeproj") {
            continue;
        }

        let project_path = workspace_dir.join(relative);
        if scheme::shared_scheme_path(&project_path, scheme_name).exists() {
            if verbose {
                log_status!(
                    "resolve",
                    "Found project with matching scheme at: {}",
                    project_path.display()
                );
            }
            return Ok(project_path);
        }
    }

    Err(Error::resolve(format!(
        "No project in {} shares the scheme '{}'",
        workspace_path.display(),
        scheme_name
    )))
}
