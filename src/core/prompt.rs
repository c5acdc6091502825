use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

/// A yes/no confirmation prompt.
pub struct YesNoPrompt {
    pub question: String,
    /// true = default yes [Y/n], false = default no [y/N]
    pub default: bool,
}

/// Free text input with a pre-filled default.
pub struct TextPrompt {
    pub question: String,
    pub default: Option<String>,
}

/// Review a list of items and confirm.
pub struct ConfirmListPrompt {
    pub header: String,
    pub items: Vec<String>,
    pub confirm_question: String,
    pub default: bool,
}

enum InputSource {
    Tty,
    Scripted(RefCell<VecDeque<String>>),
}

/// Data-driven interactive prompt engine.
/// Handles TTY detection and provides consistent prompting behavior.
pub struct PromptEngine {
    interactive: bool,
    source: InputSource,
}

impl PromptEngine {
    /// Create engine with automatic TTY detection.
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal() && io::stdout().is_terminal(),
            source: InputSource::Tty,
        }
    }

    /// Create engine with explicit interactive mode.
    pub fn with_interactive(interactive: bool) -> Self {
        Self {
            interactive,
            source: InputSource::Tty,
        }
    }

    /// Force non-interactive mode: every prompt returns its default.
    pub fn non_interactive() -> Self {
        Self::with_interactive(false)
    }

    /// Interactive engine that pops answers from a fixed script instead of
    /// reading the terminal. An empty answer accepts the default.
    pub fn scripted(answers: &[&str]) -> Self {
        Self {
            interactive: true,
            source: InputSource::Scripted(RefCell::new(
                answers.iter().map(|a| a.to_string()).collect(),
            )),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn read_line(&self) -> Option<String> {
        match &self.source {
            InputSource::Scripted(queue) => queue.borrow_mut().pop_front(),
            InputSource::Tty => {
                let mut input = String::new();
                io::stdin().lock().read_line(&mut input).ok()?;
                Some(input)
            }
        }
    }

    /// Run a yes/no prompt. Returns default if non-interactive.
    pub fn yes_no(&self, prompt: &YesNoPrompt) -> bool {
        if !self.interactive {
            return prompt.default;
        }

        let suffix = if prompt.default { "[Y/n]" } else { "[y/N]" };
        eprint!("{} {}: ", prompt.question, suffix);
        io::stderr().flush().ok();

        let Some(input) = self.read_line() else {
            return prompt.default;
        };

        let trimmed = input.trim().to_lowercase();
        if trimmed.is_empty() {
            return prompt.default;
        }

        trimmed.starts_with('y')
    }

    /// Run a free-text prompt with a pre-filled default. An empty entry
    /// (or non-interactive mode) yields the default.
    pub fn text(&self, prompt: &TextPrompt) -> String {
        let default = prompt.default.clone().unwrap_or_default();
        if !self.interactive {
            return default;
        }

        if default.is_empty() {
            eprint!("{}: ", prompt.question);
        } else {
            eprint!("{} [{}]: ", prompt.question, default);
        }
        io::stderr().flush().ok();

        let Some(input) = self.read_line() else {
            return default;
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return default;
        }
        trimmed.to_string()
    }

    /// Non-echoing secret entry. Returns an empty string when
    /// non-interactive or when the terminal read fails.
    pub fn secret(&self, question: &str) -> String {
        if !self.interactive {
            return String::new();
        }
        match &self.source {
            InputSource::Scripted(queue) => queue
                .borrow_mut()
                .pop_front()
                .unwrap_or_default()
                .trim()
                .to_string(),
            InputSource::Tty => rpassword::prompt_password(format!("{}: ", question))
                .unwrap_or_default()
                .trim()
                .to_string(),
        }
    }

    /// Display a message to stderr (only in interactive mode).
    pub fn message(&self, msg: &str) {
        if self.interactive {
            eprintln!("{}", msg);
        }
    }

    /// Run a confirm list prompt (show items, ask confirmation).
    pub fn confirm_list(&self, prompt: &ConfirmListPrompt) -> bool {
        if !self.interactive {
            return prompt.default;
        }

        eprintln!("{}", prompt.header);
        for item in &prompt.items {
            eprintln!("  {}", item);
        }
        eprintln!();

        self.yes_no(&YesNoPrompt {
            question: prompt.confirm_question.clone(),
            default: prompt.default,
        })
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_returns_defaults() {
        let engine = PromptEngine::non_interactive();
        assert!(engine.yes_no(&YesNoPrompt {
            question: "Bump build number?".into(),
            default: true,
        }));
        assert!(!engine.yes_no(&YesNoPrompt {
            question: "Upload?".into(),
            default: false,
        }));
        assert_eq!(
            engine.text(&TextPrompt {
                question: "Bundle Identifier".into(),
                default: Some("com.example.app".into()),
            }),
            "com.example.app"
        );
        assert_eq!(engine.secret("Password"), "");
    }

    #[test]
    fn scripted_answers_are_consumed_in_order() {
        let engine = PromptEngine::scripted(&["n", "com.example.other", ""]);
        assert!(!engine.yes_no(&YesNoPrompt {
            question: "Delete?".into(),
            default: true,
        }));
        assert_eq!(
            engine.text(&TextPrompt {
                question: "Bundle Identifier".into(),
                default: Some("com.example.app".into()),
            }),
            "com.example.other"
        );
        // Empty scripted answer falls back to the default.
        assert_eq!(
            engine.text(&TextPrompt {
                question: "Version String".into(),
                default: Some("1.2.0".into()),
            }),
            "1.2.0"
        );
    }

    #[test]
    fn exhausted_script_yields_defaults() {
        let engine = PromptEngine::scripted(&[]);
        assert!(engine.yes_no(&YesNoPrompt {
            question: "Continue?".into(),
            default: true,
        }));
    }

    #[test]
    fn confirm_list_uses_default_when_non_interactive() {
        let engine = PromptEngine::non_interactive();
        assert!(engine.confirm_list(&ConfirmListPrompt {
            header: "Stale artifacts:".into(),
            items: vec!["App.ipa".into()],
            confirm_question: "Delete them and build a new .ipa?".into(),
            default: true,
        }));
    }
}
