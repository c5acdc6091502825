//! Credential storage behind a narrow seam so the upload flow can be
//! driven by an in-memory store in tests.
//!
//! The production store is the system keychain (macOS Keychain, Linux
//! Secret Service, Windows Credential Manager). Two entries live under the
//! fixed service name: the `account` key holds the account name, and a key
//! named after the account holds its secret. Nothing is cached in process
//! memory between runs.

use crate::{Error, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "shipit";
const ACCOUNT_KEY: &str = "account";

/// Holds upload credentials on behalf of the pipeline.
pub trait CredentialStore {
    /// Returns the stored account name, or `None` when no credentials exist.
    fn stored_account(&self) -> Result<Option<String>>;

    fn store_credentials(&self, account: &str, secret: &str) -> Result<()>;

    fn delete_credentials(&self, account: &str) -> Result<()>;
}

fn keyring_error(e: keyring::Error) -> Error {
    Error::Keychain(e.to_string())
}

/// Production store: the OS keychain.
pub struct KeychainStore;

impl CredentialStore for KeychainStore {
    fn stored_account(&self) -> Result<Option<String>> {
        let entry = Entry::new(SERVICE_NAME, ACCOUNT_KEY).map_err(keyring_error)?;
        match entry.get_password() {
            Ok(account) => Ok(Some(account)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(e)),
        }
    }

    fn store_credentials(&self, account: &str, secret: &str) -> Result<()> {
        let name_entry = Entry::new(SERVICE_NAME, ACCOUNT_KEY).map_err(keyring_error)?;
        name_entry.set_password(account).map_err(keyring_error)?;

        let secret_entry = Entry::new(SERVICE_NAME, account).map_err(keyring_error)?;
        secret_entry.set_password(secret).map_err(keyring_error)?;
        Ok(())
    }

    fn delete_credentials(&self, account: &str) -> Result<()> {
        for key in [ACCOUNT_KEY, account] {
            let entry = Entry::new(SERVICE_NAME, key).map_err(keyring_error)?;
            match entry.delete_credential() {
                Ok(()) => {}
                Err(keyring::Error::NoEntry) => {} // Already deleted
                Err(e) => return Err(keyring_error(e)),
            }
        }
        Ok(())
    }
}
