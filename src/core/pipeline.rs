//! The release pipeline.
//!
//! Stages run strictly in order: validate options, resolve the target,
//! edit metadata, bump the build number, build, upload, archive. Each
//! stage hands a value to the next; nothing runs concurrently and nothing
//! is retried.

use std::env;
use std::path::PathBuf;

use crate::build;
use crate::executor::CommandRunner;
use crate::keychain::{CredentialStore, KeychainStore};
use crate::log_status;
use crate::metadata;
use crate::options::ShipOptions;
use crate::prompt::PromptEngine;
use crate::publish;
use crate::resolve;
use crate::Result;

const UPLOAD_BANNER: &str = "************************\n\
**  Upload selected...\n\
**  Make sure your app is in the 'Waiting for upload' state on iTunes connect\n\
************************";

/// One release run. Owns the options and drives every stage.
pub struct Ship<'a> {
    opts: ShipOptions,
    runner: &'a dyn CommandRunner,
    prompts: PromptEngine,
    store: &'a dyn CredentialStore,
    work_dir: PathBuf,
}

impl<'a> Ship<'a> {
    pub fn new(opts: ShipOptions, runner: &'a dyn CommandRunner, prompts: PromptEngine) -> Self {
        Self {
            opts,
            runner,
            prompts,
            store: &KeychainStore,
            work_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = work_dir;
        self
    }

    pub fn with_credential_store(mut self, store: &'a dyn CredentialStore) -> Self {
        self.store = store;
        self
    }

    pub fn run(&mut self) -> Result<()> {
        if self.opts.upload {
            println!("{}", UPLOAD_BANNER);
        }

        if self.opts.verbose {
            log_status!("ship", "Validating options and finding required files...");
        }
        self.opts.validate()?;

        let resolved = resolve::resolve(&self.opts, self.runner)?;
        if self.opts.verbose {
            log_status!("ship", "So far so good...");
        }

        metadata::edit(&resolved, &self.prompts, self.opts.verbose)?;
        metadata::bump_build_number(&resolved, &self.prompts, self.runner);

        let outcome = build::run(
            &resolved,
            &self.opts,
            &self.prompts,
            self.runner,
            &self.work_dir,
        )?;

        publish::upload(
            &resolved,
            &outcome,
            &self.opts,
            &self.prompts,
            self.store,
            self.runner,
            &self.work_dir,
        )?;
        publish::archive(&resolved, &outcome, &self.opts, &self.work_dir);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BUILD_TOOL;
    use crate::executor::fake::FakeRunner;
    use crate::publish::UPLOAD_TOOL;
    use crate::resolve::fixtures::{
        options_for_project, project_runner, write_project, INFO_PLIST,
    };
    use crate::workspace::fixtures::write_workspace;
    use std::fs;

    fn ship(opts: ShipOptions, runner: &FakeRunner, work: &std::path::Path) -> Result<()> {
        Ship::new(opts, runner, PromptEngine::non_interactive())
            .with_work_dir(work.to_path_buf())
            .run()
    }

    #[test]
    fn project_happy_path_builds_once_and_leaves_the_plist_alone() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = write_project(dir.path(), "App");
        let runner = project_runner("App", &["Release"]);
        let work = tempfile::tempdir().unwrap();

        let plist_before = fs::read(dir.path().join("Info.plist")).unwrap();
        ship(options_for_project(&project_path), &runner, work.path()).unwrap();

        // Defaults accepted everywhere: plist untouched, one build, no upload.
        assert_eq!(fs::read(dir.path().join("Info.plist")).unwrap(), plist_before);
        assert_eq!(runner.calls_to(BUILD_TOOL), 1);
        assert_eq!(runner.calls_to(UPLOAD_TOOL), 0);

        let invocations = runner.invocations.borrow();
        let build_call = invocations
            .iter()
            .find(|i| i.program == BUILD_TOOL)
            .unwrap();
        assert!(build_call.streamed);
        assert_eq!(build_call.args[0], "build");
    }

    #[test]
    fn workspace_happy_path_resolves_the_member_project() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = write_workspace(dir.path(), "All", &["Lib", "App"]);
        fs::write(dir.path().join("Info.plist"), INFO_PLIST).unwrap();
        let runner = project_runner("App", &["Release"]);
        let work = tempfile::tempdir().unwrap();

        let opts = ShipOptions {
            workspace: Some(workspace.to_string_lossy().into_owned()),
            scheme: "App".to_string(),
            ..Default::default()
        };
        ship(opts, &runner, work.path()).unwrap();

        let invocations = runner.invocations.borrow();
        let build_call = invocations
            .iter()
            .find(|i| i.program == BUILD_TOOL)
            .unwrap();
        assert_eq!(build_call.args[1], "--workspace");
    }

    #[test]
    fn configuration_default_is_applied_before_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = write_project(dir.path(), "App");
        let runner = project_runner("App", &["Release"]);
        let work = tempfile::tempdir().unwrap();

        let mut opts = options_for_project(&project_path);
        opts.configuration = String::new();
        ship(opts, &runner, work.path()).unwrap();
    }

    #[test]
    fn unknown_configuration_aborts_before_building() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = write_project(dir.path(), "App");
        let runner = project_runner("App", &["Release", "Staging"]);
        let work = tempfile::tempdir().unwrap();

        let mut opts = options_for_project(&project_path);
        opts.configuration = "Debug".to_string();
        let err = ship(opts, &runner, work.path()).unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("\n  Release"));
        assert!(err.to_string().contains("\n  Staging"));
        assert_eq!(runner.calls_to(BUILD_TOOL), 0);
    }

    #[test]
    fn missing_selector_fails_without_touching_anything() {
        let runner = FakeRunner::new();
        let work = tempfile::tempdir().unwrap();

        let opts = ShipOptions {
            scheme: "App".to_string(),
            ..Default::default()
        };
        let err = ship(opts, &runner, work.path()).unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(runner.invocations.borrow().is_empty());
    }

    #[test]
    fn kept_existing_ipa_skips_build_and_archive() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = write_project(dir.path(), "App");
        let runner = project_runner("App", &["Release"]);
        let work = tempfile::tempdir().unwrap();
        fs::write(work.path().join("App.ipa"), b"ipa").unwrap();

        let mut opts = options_for_project(&project_path);
        opts.archive = true;
        // Defaults through metadata and bump; decline deletion; decline the
        // old-build upload.
        let prompts = PromptEngine::scripted(&["", "", "y", "n", "n"]);
        Ship::new(opts, &runner, prompts)
            .with_work_dir(work.path().to_path_buf())
            .run()
            .unwrap();

        assert_eq!(runner.calls_to(BUILD_TOOL), 0);
        assert_eq!(runner.calls_to(UPLOAD_TOOL), 0);
        assert!(work.path().join("App.ipa").exists());
    }

    #[test]
    fn upload_flag_ships_the_fresh_build() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = write_project(dir.path(), "App");
        let runner = project_runner("App", &["Release"]);
        let work = tempfile::tempdir().unwrap();

        let mut opts = options_for_project(&project_path);
        opts.upload = true;
        let store = crate::keychain::fake::MemoryStore::with_account("dev@example.com", "s3cret");
        Ship::new(opts, &runner, PromptEngine::non_interactive())
            .with_credential_store(&store)
            .with_work_dir(work.path().to_path_buf())
            .run()
            .unwrap();

        assert_eq!(runner.calls_to(BUILD_TOOL), 1);
        assert_eq!(runner.calls_to(UPLOAD_TOOL), 1);
    }

    #[test]
    fn failed_build_aborts_before_upload() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = write_project(dir.path(), "App");
        let runner = project_runner("App", &["Release"]).streamed_exit(BUILD_TOOL, 1);
        let work = tempfile::tempdir().unwrap();

        let mut opts = options_for_project(&project_path);
        opts.upload = true;
        let err = ship(opts, &runner, work.path()).unwrap_err();

        assert_eq!(err.code(), "BUILD_FAILED");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(runner.calls_to(UPLOAD_TOOL), 0);
    }
}
