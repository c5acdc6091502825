//! Stale-artifact handling and the external build invocation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::executor::{display_command, CommandRunner};
use crate::log_status;
use crate::options::ShipOptions;
use crate::prompt::{ConfirmListPrompt, PromptEngine, YesNoPrompt};
use crate::resolve::ResolvedTarget;
use crate::{Error, Result};

pub const BUILD_TOOL: &str = "ipa";

/// What the build stage decided and did.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    /// The operator kept an existing .ipa; no build ran. Archiving is
    /// skipped too, since no fresh archive exists.
    pub skipped: bool,
    /// The operator asked to upload the kept .ipa.
    pub upload_existing: bool,
}

/// Artifacts a previous run may have left in the working directory:
/// the product .ipa, its dSYM zip, and any sibling xcarchive directories.
pub fn stale_artifacts(resolved: &ResolvedTarget, dir: &Path) -> Vec<PathBuf> {
    let mut artifacts = Vec::new();
    for name in [resolved.ipa_name(), resolved.dsym_name()] {
        let path = dir.join(&name);
        if path.exists() {
            artifacts.push(path);
        }
    }
    if let Ok(entries) = fs::read_dir(dir) {
        let mut archives: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir() && p.extension().is_some_and(|e| e == "xcarchive"))
            .collect();
        archives.sort();
        artifacts.extend(archives);
    }
    artifacts
}

/// Clear (or keep) stale artifacts, then run the external build.
/// A nonzero build exit aborts the whole pipeline.
pub fn run(
    resolved: &ResolvedTarget,
    opts: &ShipOptions,
    prompts: &PromptEngine,
    runner: &dyn CommandRunner,
    work_dir: &Path,
) -> Result<BuildOutcome> {
    let mut outcome = BuildOutcome::default();

    let stale = stale_artifacts(resolved, work_dir);
    if !stale.is_empty() {
        let delete = prompts.confirm_list(&ConfirmListPrompt {
            header: "The following files look like they may be from a previous build:".to_string(),
            items: stale
                .iter()
                .map(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| p.display().to_string())
                })
                .collect(),
            confirm_question: "Delete them and build a new .ipa?".to_string(),
            default: true,
        });

        if delete {
            for path in &stale {
                if path.is_dir() {
                    fs::remove_dir_all(path)?;
                } else {
                    fs::remove_file(path)?;
                }
            }
        } else if work_dir.join(resolved.ipa_name()).exists() {
            outcome.skipped = true;
            outcome.upload_existing = prompts.yes_no(&YesNoPrompt {
                question: "Do you want to upload the existing .ipa to iTunes Connect?".to_string(),
                default: false,
            });
        }
    }

    if outcome.skipped {
        return Ok(outcome);
    }

    let args = build_args(opts);
    println!("Building .ipa");
    if opts.verbose {
        log_status!("build", "Build command:\n{}", display_command(BUILD_TOOL, &args));
    }

    let started = Instant::now();
    let status = runner.run_streamed(BUILD_TOOL, &args, Some(work_dir));
    if status != 0 {
        return Err(Error::BuildFailed(status));
    }

    let seconds = started.elapsed().as_secs();
    log_status!("build", "Build finished in {}m{:02}s", seconds / 60, seconds % 60);

    Ok(outcome)
}

fn build_args(opts: &ShipOptions) -> Vec<String> {
    let mut args = vec!["build".to_string()];
    if let Some(workspace) = &opts.workspace {
        args.push("--workspace".to_string());
        args.push(workspace.clone());
    } else if let Some(project) = &opts.project {
        args.push("--project".to_string());
        args.push(project.clone());
    }
    args.push("--scheme".to_string());
    args.push(opts.scheme.clone());
    args.push("--configuration".to_string());
    args.push(opts.configuration.clone());
    args
}
