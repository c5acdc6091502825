// Public modules
pub mod build;
pub mod error;
pub mod executor;
pub mod keychain;
pub mod metadata;
pub mod options;
pub mod pipeline;
pub mod project;
pub mod prompt;
pub mod publish;
pub mod resolve;
pub mod scheme;
pub mod shell;
pub mod workspace;

// Re-export common types for convenience
pub use error::{Error, Result};
pub use executor::{CommandOutput, CommandRunner, SystemRunner};
pub use keychain::{CredentialStore, KeychainStore};
pub use options::ShipOptions;
pub use pipeline::Ship;
pub use prompt::PromptEngine;
pub use resolve::ResolvedTarget;
