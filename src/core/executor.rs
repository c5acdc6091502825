// External process invocation behind a narrow seam so the pipeline can be
// driven by a scripted runner in tests.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::shell;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

/// Runs external tools on behalf of the pipeline.
///
/// `run` captures output for commands whose output the pipeline inspects
/// (`xcodebuild`, `agvtool`). `run_streamed` inherits stdio for the build
/// and upload tools, which stream their own progress to the operator.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> CommandOutput;

    /// Returns the exit code (-1 when the process could not be spawned).
    fn run_streamed(&self, program: &str, args: &[String], cwd: Option<&Path>) -> i32;
}

/// Production runner: spawns real processes.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> CommandOutput {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        match cmd.output() {
            Ok(out) => CommandOutput {
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
                success: out.status.success(),
                exit_code: out.status.code().unwrap_or(-1),
            },
            Err(e) => CommandOutput {
                stdout: String::new(),
                stderr: format!("Command error: {}", e),
                success: false,
                exit_code: -1,
            },
        }
    }

    fn run_streamed(&self, program: &str, args: &[String], cwd: Option<&Path>) -> i32 {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        match cmd.status() {
            Ok(status) => status.code().unwrap_or(-1),
            Err(e) => {
                eprintln!("Command error: {}", e);
                -1
            }
        }
    }
}

/// Render a command line for verbose display.
pub fn display_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        return program.to_string();
    }
    format!("{} {}", program, shell::quote_args(args))
}
