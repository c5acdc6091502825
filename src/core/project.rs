//! Project model access through `xcodebuild`.
//!
//! Target and configuration enumeration comes from `xcodebuild -list
//! -json`; per-configuration build settings from `-showBuildSettings`.
//! Both go through the command runner so tests can script them.

use std::path::Path;

use serde::Deserialize;

use crate::executor::CommandRunner;
use crate::{Error, Result};

pub const XCODEBUILD: &str = "xcodebuild";

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub configurations: Vec<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListOutput {
    project: ProjectInfo,
}

/// Enumerate targets, configurations, and schemes for a project.
pub fn list(runner: &dyn CommandRunner, project_path: &Path) -> Result<ProjectInfo> {
    let args = vec![
        "-list".to_string(),
        "-json".to_string(),
        "-project".to_string(),
        project_path.to_string_lossy().into_owned(),
    ];
    let output = runner.run(XCODEBUILD, &args, None);
    if !output.success {
        return Err(Error::resolve(format!(
            "xcodebuild -list failed for {}: {}",
            project_path.display(),
            output.stderr.trim()
        )));
    }

    let parsed: ListOutput = serde_json::from_str(&output.stdout)
        .map_err(|e| Error::resolve(format!("Unexpected xcodebuild -list output: {}", e)))?;
    Ok(parsed.project)
}

/// The two build settings the pipeline reads.
#[derive(Debug, Clone, Default)]
pub struct BuildSettings {
    pub info_plist: Option<String>,
    pub product_name: Option<String>,
}

/// Fetch the settings for one target/configuration pair.
pub fn build_settings(
    runner: &dyn CommandRunner,
    project_path: &Path,
    target: &str,
    configuration: &str,
) -> Result<BuildSettings> {
    let args = vec![
        "-project".to_string(),
        project_path.to_string_lossy().into_owned(),
        "-target".to_string(),
        target.to_string(),
        "-configuration".to_string(),
        configuration.to_string(),
        "-showBuildSettings".to_string(),
    ];
    let output = runner.run(XCODEBUILD, &args, None);
    if !output.success {
        return Err(Error::resolve(format!(
            "xcodebuild -showBuildSettings failed for target '{}' ({}): {}",
            target,
            configuration,
            output.stderr.trim()
        )));
    }

    Ok(parse_build_settings(&output.stdout))
}

/// Parse `KEY = VALUE` lines from -showBuildSettings output.
fn parse_build_settings(stdout: &str) -> BuildSettings {
    let mut settings = BuildSettings::default();
    for line in stdout.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "INFOPLIST_FILE" => settings.info_plist = Some(value.trim().to_string()),
            "PRODUCT_NAME" => settings.product_name = Some(value.trim().to_string()),
            _ => {}
        }
    }
    settings
}
