//! Build-configuration resolution.
//!
//! Turns a validated selector into a fully-initialized [`ResolvedTarget`].
//! Every derived field is computed here in dependency order; later stages
//! read plain fields and never re-derive anything.

use std::path::{Path, PathBuf};

use crate::executor::CommandRunner;
use crate::log_status;
use crate::options::ShipOptions;
use crate::project;
use crate::scheme;
use crate::workspace;
use crate::{Error, Result};

/// The concrete project/target/configuration triple plus everything the
/// later stages need from it.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// The concrete `.xcodeproj` the scheme lives in.
    pub project_path: PathBuf,
    pub target_name: String,
    pub configuration: String,
    pub product_name: String,
    pub info_plist_path: PathBuf,
}

impl ResolvedTarget {
    /// Directory holding the project bundle; `agvtool` runs here.
    pub fn project_dir(&self) -> &Path {
        self.project_path.parent().unwrap_or(Path::new("."))
    }

    pub fn ipa_name(&self) -> String {
        format!("{}.ipa", self.product_name)
    }

    pub fn dsym_name(&self) -> String {
        format!("{}.app.dSYM.zip", self.product_name)
    }
}

/// Resolve a validated selector against the project model.
pub fn resolve(opts: &ShipOptions, runner: &dyn CommandRunner) -> Result<ResolvedTarget> {
    let root_path = opts.root_path();

    let project_path = if opts.workspace.is_some() {
        if opts.verbose {
            log_status!("resolve", "Loading workspace at: {}", root_path.display());
        }
        workspace::project_for_scheme(&root_path, &opts.scheme, opts.verbose)?
    } else {
        root_path
    };
    if opts.verbose {
        log_status!(
            "resolve",
            "Looking for project file at: {}",
            project_path.display()
        );
    }

    let scheme_path = scheme::shared_scheme_path(&project_path, &opts.scheme);
    if !scheme_path.exists() {
        return Err(Error::resolve(
            "Specified scheme does not exist or is not shared",
        ));
    }
    let target_name = scheme::target_name(&scheme_path)?;

    let info = project::list(runner, &project_path)?;
    if !info.targets.iter().any(|t| t == &target_name) {
        return Err(Error::resolve(format!(
            "Target '{}' from the scheme was not found in {}",
            target_name,
            project_path.display()
        )));
    }

    if !info.configurations.iter().any(|c| c == &opts.configuration) {
        return Err(Error::config(format!(
            "Configuration {} does not exist in the scheme's target. Possible options are:\n  {}",
            opts.configuration,
            info.configurations.join("\n  ")
        )));
    }

    let settings = project::build_settings(runner, &project_path, &target_name, &opts.configuration)?;

    // "$(TARGET_NAME)" is xcodebuild's way of saying the product is named
    // after the target.
    let product_name = match settings.product_name.as_deref() {
        None | Some("$(TARGET_NAME)") => target_name.clone(),
        Some(name) => name.to_string(),
    };

    let info_plist = settings.info_plist.clone().ok_or_else(|| {
        Error::resolve(format!(
            "No INFOPLIST_FILE in the {} build settings for target '{}'",
            opts.configuration, target_name
        ))
    })?;
    let info_plist_path = project_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(&info_plist);
    if !info_plist_path.exists() {
        return Err(Error::resolve("Cannot find plist file"));
    }

    Ok(ResolvedTarget {
        project_path,
        target_name,
        configuration: opts.configuration.clone(),
        product_name,
        info_plist_path,
    })
}
