//! Scheme document parsing.
//!
//! A scheme is a shared XML file inside the project bundle. The only part
//! the pipeline cares about is the first buildable reference under the
//! build action: its `BlueprintName` attribute names the target the scheme
//! builds.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Location of a shared scheme inside a project bundle.
pub fn shared_scheme_path(project_path: &Path, scheme: &str) -> PathBuf {
    project_path
        .join("xcshareddata")
        .join("xcschemes")
        .join(format!("{}.xcscheme", scheme))
}

/// Extract the target name from the scheme's first build-action buildable
/// reference.
pub fn target_name(scheme_path: &Path) -> Result<String> {
    let text = fs::read_to_string(scheme_path)
        .map_err(|_| Error::resolve("Specified scheme does not exist or is not shared"))?;

    let doc = roxmltree::Document::parse(&text).map_err(|e| {
        Error::resolve(format!(
            "Malformed scheme file {}: {}",
            scheme_path.display(),
            e
        ))
    })?;

    doc.descendants()
        .filter(|n| n.has_tag_name("BuildAction"))
        .flat_map(|action| {
            action
                .descendants()
                .filter(|n| n.has_tag_name("BuildableReference"))
        })
        .find_map(|reference| reference.attribute("BlueprintName"))
        .map(str::to_string)
        .ok_or_else(|| {
            Error::resolve(format!(
                "Scheme {} has no buildable reference",
                scheme_path.display()
            ))
        })
}
