//! Info.plist metadata editing and the build-number bump.

use plist::Value;
use std::path::{Path, PathBuf};

use crate::executor::CommandRunner;
use crate::log_status;
use crate::prompt::{PromptEngine, TextPrompt, YesNoPrompt};
use crate::resolve::ResolvedTarget;
use crate::{Error, Result};

const BUNDLE_IDENTIFIER: &str = "CFBundleIdentifier";
const SHORT_VERSION: &str = "CFBundleShortVersionString";

/// The two identifying metadata fields, plus the parsed plist they came
/// from so edits can be written back without disturbing other keys.
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    path: PathBuf,
    root: Value,
    pub bundle_identifier: String,
    pub short_version: String,
}

impl MetadataRecord {
    pub fn load(path: &Path) -> Result<Self> {
        let root = Value::from_file(path)?;
        let dict = root.as_dictionary().ok_or_else(|| {
            Error::resolve(format!("{} is not a plist dictionary", path.display()))
        })?;
        let bundle_identifier = string_key(dict, BUNDLE_IDENTIFIER);
        let short_version = string_key(dict, SHORT_VERSION);
        Ok(Self {
            path: path.to_path_buf(),
            root,
            bundle_identifier,
            short_version,
        })
    }

    /// Write both fields back. Callers only invoke this after a value
    /// actually changed; an untouched record never rewrites the file.
    pub fn save(&mut self) -> Result<()> {
        if let Some(dict) = self.root.as_dictionary_mut() {
            dict.insert(
                BUNDLE_IDENTIFIER.to_string(),
                Value::String(self.bundle_identifier.clone()),
            );
            dict.insert(
                SHORT_VERSION.to_string(),
                Value::String(self.short_version.clone()),
            );
        }
        self.root.to_file_xml(&self.path)?;
        Ok(())
    }
}

fn string_key(dict: &plist::Dictionary, key: &str) -> String {
    dict.get(key)
        .and_then(Value::as_string)
        .unwrap_or_default()
        .to_string()
}

/// Present both metadata fields as editable defaults and rewrite the plist
/// when either changed. Returns true when a write happened.
pub fn edit(resolved: &ResolvedTarget, prompts: &PromptEngine, verbose: bool) -> Result<bool> {
    let mut record = MetadataRecord::load(&resolved.info_plist_path)?;

    let bundle_identifier = prompts.text(&TextPrompt {
        question: "Bundle Identifier".to_string(),
        default: Some(record.bundle_identifier.clone()),
    });
    let short_version = prompts.text(&TextPrompt {
        question: "Version String".to_string(),
        default: Some(record.short_version.clone()),
    });

    let changed = bundle_identifier != record.bundle_identifier
        || short_version != record.short_version;
    if changed {
        record.bundle_identifier = bundle_identifier;
        record.short_version = short_version;
        if verbose {
            let name = resolved
                .info_plist_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            log_status!("metadata", "Updating {}", name);
        }
        record.save()?;
    }
    Ok(changed)
}

/// Best-effort build number bump via `agvtool`, scoped to the project
/// directory. Its exit status is deliberately not checked; the operator
/// can bump by hand if the tool is unavailable.
pub fn bump_build_number(
    resolved: &ResolvedTarget,
    prompts: &PromptEngine,
    runner: &dyn CommandRunner,
) {
    let bump = prompts.yes_no(&YesNoPrompt {
        question: "Bump build number?".to_string(),
        default: true,
    });
    if !bump {
        return;
    }

    let args = vec!["bump".to_string(), "-all".to_string()];
    let output = runner.run("agvtool", &args, Some(resolved.project_dir()));
    if !output.stdout.is_empty() {
        print!("{}", output.stdout);
    }
    if !output.success {
        log_status!("metadata", "agvtool bump did not succeed; continuing anyway");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::fake::FakeRunner;
    use crate::resolve::fixtures::{options_for_project, project_runner, write_project};
    use crate::resolve::resolve;
    use std::fs;

    fn resolved_app(dir: &Path) -> ResolvedTarget {
        let project_path = write_project(dir, "App");
        let runner = project_runner("App", &["Release"]);
        let opts = options_for_project(&project_path);
        resolve(&opts, &runner).unwrap()
    }

    #[test]
    fn load_reads_both_fields() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolved_app(dir.path());

        let record = MetadataRecord::load(&resolved.info_plist_path).unwrap();
        assert_eq!(record.bundle_identifier, "com.example.app");
        assert_eq!(record.short_version, "1.2.0");
    }

    #[test]
    fn noop_edit_leaves_the_file_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolved_app(dir.path());
        let before = fs::read(&resolved.info_plist_path).unwrap();

        // Accepting both defaults must not write.
        let prompts = PromptEngine::scripted(&["", ""]);
        let changed = edit(&resolved, &prompts, false).unwrap();

        assert!(!changed);
        let after = fs::read(&resolved.info_plist_path).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn changed_identifier_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolved_app(dir.path());

        let prompts = PromptEngine::scripted(&["com.example.renamed", ""]);
        let changed = edit(&resolved, &prompts, false).unwrap();
        assert!(changed);

        let record = MetadataRecord::load(&resolved.info_plist_path).unwrap();
        assert_eq!(record.bundle_identifier, "com.example.renamed");
        // Version string stays untouched.
        assert_eq!(record.short_version, "1.2.0");
    }

    #[test]
    fn save_preserves_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolved_app(dir.path());

        let prompts = PromptEngine::scripted(&["", "2.0.0"]);
        edit(&resolved, &prompts, false).unwrap();

        let root = Value::from_file(&resolved.info_plist_path).unwrap();
        let dict = root.as_dictionary().unwrap();
        assert_eq!(
            dict.get("CFBundleVersion").and_then(Value::as_string),
            Some("42")
        );
        assert_eq!(
            dict.get(SHORT_VERSION).and_then(Value::as_string),
            Some("2.0.0")
        );
    }

    #[test]
    fn bump_runs_agvtool_in_the_project_directory() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolved_app(dir.path());

        let runner = FakeRunner::new();
        let prompts = PromptEngine::scripted(&["y"]);
        bump_build_number(&resolved, &prompts, &runner);

        let invocations = runner.invocations.borrow();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].program, "agvtool");
        assert_eq!(invocations[0].args, vec!["bump", "-all"]);
        assert_eq!(invocations[0].cwd.as_deref(), Some(dir.path()));
    }

    #[test]
    fn declined_bump_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolved_app(dir.path());

        let runner = FakeRunner::new();
        let prompts = PromptEngine::scripted(&["n"]);
        bump_build_number(&resolved, &prompts, &runner);

        assert!(runner.invocations.borrow().is_empty());
    }
}
