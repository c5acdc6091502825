use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Resolve(String),

    #[error("Build failed with exit status {0} -- aborting")]
    BuildFailed(i32),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Resolve(_) => "RESOLVE_ERROR",
            Error::BuildFailed(_) => "BUILD_FAILED",
            Error::Keychain(_) => "KEYCHAIN_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Plist(_) => "PLIST_ERROR",
        }
    }

    /// Process exit code for terminal errors. Selector and resolution
    /// problems are usage-style failures and exit 2; everything else
    /// exits 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config(_) | Error::Resolve(_) => 2,
            _ => 1,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn resolve(message: impl Into<String>) -> Self {
        Error::Resolve(message.into())
    }
}
