//! Upload to iTunes Connect and local archive bookkeeping.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::build::BuildOutcome;
use crate::executor::{display_command, CommandRunner};
use crate::keychain::CredentialStore;
use crate::log_status;
use crate::options::ShipOptions;
use crate::prompt::{PromptEngine, TextPrompt, YesNoPrompt};
use crate::resolve::ResolvedTarget;
use crate::{Error, Result};

pub const UPLOAD_TOOL: &str = "xcrun";

/// Upload the .ipa when asked to. Without `--upload` (and without the
/// operator electing to ship a kept build) this only prints guidance.
pub fn upload(
    resolved: &ResolvedTarget,
    outcome: &BuildOutcome,
    opts: &ShipOptions,
    prompts: &PromptEngine,
    store: &dyn CredentialStore,
    runner: &dyn CommandRunner,
    work_dir: &Path,
) -> Result<()> {
    let requested = opts.upload || outcome.upload_existing;
    if !requested {
        println!("To upload your app to iTunes Connect, be sure to set the --upload option");
        return Ok(());
    }

    let account = ensure_credentials(store, prompts)?;
    prompts.message(&format!("Uploading as {}", account));

    if outcome.upload_existing {
        println!("Uploading previous build...");
    }

    let args = upload_args(resolved);
    if opts.verbose {
        log_status!("upload", "Upload command:\n{}", display_command(UPLOAD_TOOL, &args));
    }

    // The upload tool reports its own validation failures on the terminal;
    // its exit status is not treated as a pipeline failure.
    runner.run_streamed(UPLOAD_TOOL, &args, Some(work_dir));
    Ok(())
}

fn upload_args(resolved: &ResolvedTarget) -> Vec<String> {
    vec![
        "-sdk".to_string(),
        "iphoneos".to_string(),
        "Validation".to_string(),
        "-online".to_string(),
        "-upload".to_string(),
        "-verbose".to_string(),
        resolved.ipa_name(),
    ]
}

/// Return the account to upload as, collecting and storing credentials when
/// the store has none (or the operator declines the stored account).
fn ensure_credentials(store: &dyn CredentialStore, prompts: &PromptEngine) -> Result<String> {
    if let Some(account) = store.stored_account()? {
        let reuse = prompts.yes_no(&YesNoPrompt {
            question: format!("Found credentials for {}. Use them?", account),
            default: true,
        });
        if reuse {
            return Ok(account);
        }
        store.delete_credentials(&account)?;
    }

    let account = prompts.text(&TextPrompt {
        question: "iTunes Connect account".to_string(),
        default: None,
    });
    if account.is_empty() {
        return Err(Error::Keychain(
            "An iTunes Connect account is required to upload".to_string(),
        ));
    }
    let secret = prompts.secret("Password");
    if secret.is_empty() {
        return Err(Error::Keychain(
            "A password is required to upload".to_string(),
        ));
    }

    store.store_credentials(&account, &secret)?;
    Ok(account)
}

/// Copy the newest matching xcarchive into the working directory. Every
/// failure mode here logs and returns; archiving never fails the run.
pub fn archive(
    resolved: &ResolvedTarget,
    outcome: &BuildOutcome,
    opts: &ShipOptions,
    work_dir: &Path,
) {
    if !opts.archive {
        return;
    }
    if outcome.skipped {
        log_status!("archive", "No fresh build to archive; skipping");
        return;
    }

    let Some(home) = dirs::home_dir() else {
        log_status!("archive", "Could not locate the home directory; skipping");
        return;
    };
    let day_dir = home
        .join("Library")
        .join("Developer")
        .join("Xcode")
        .join("Archives")
        .join(Local::now().format("%Y-%m-%d").to_string());

    let Some(source) = find_archive(&day_dir, &resolved.product_name) else {
        log_status!(
            "archive",
            "No archive for {} found under {}",
            resolved.product_name,
            day_dir.display()
        );
        return;
    };

    let file_name = format!("{}.xcarchive", resolved.product_name);
    let destination = work_dir.join(&file_name);
    match copy_dir(&source, &destination) {
        Ok(()) => log_status!("archive", "Copied {} to the working directory", file_name),
        Err(e) => log_status!("archive", "Could not copy {}: {}", source.display(), e),
    }
}

/// Newest (by modification time) xcarchive in `day_dir` whose name starts
/// with the product name.
fn find_archive(day_dir: &Path, product_name: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(day_dir).ok()?;
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.extension().is_some_and(|e| e == "xcarchive")
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(product_name))
        })
        .max_by_key(|p| {
            p.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        })
}

fn copy_dir(source: &Path, destination: &Path) -> std::io::Result<()> {
    fs::create_dir_all(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
