use crate::error::StorageError;
use crate::models::{Account, AccountsDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// Accounts document, written back to its file when an account changes
#[derive(Debug)]
pub struct AccountStore {
    document: AccountsDocument,
    path: Option<PathBuf>,
}

impl AccountStore {
    pub fn from_document(document: AccountsDocument) -> AccountStore {
        AccountStore {
            document,
            path: None,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<AccountStore, StorageError> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        let document: AccountsDocument =
            serde_json::from_str(&content).map_err(|source| StorageError::Json {
                key: path.display().to_string(),
                source,
            })?;
        debug!(accounts = document.users.len(), path = %path.display(), "loaded accounts");
        Ok(AccountStore {
            document,
            path: Some(path),
        })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.document.users
    }

    pub fn find_by_username(&self, username: &str) -> Option<&Account> {
        self.document.users.iter().find(|a| a.username == username)
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.document.users.iter().find(|a| a.id == id)
    }

    /// Swaps in the account list served by the backend, keeping `meta`.
    pub fn replace_users(&mut self, users: Vec<Account>) {
        debug!(accounts = users.len(), "accounts refreshed");
        self.document.users = users;
        if let Err(err) = self.write_back() {
            warn!(error = %err, "could not persist refreshed accounts");
        }
    }

    /// Sets the enabled flag; the file write is best-effort.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        let Some(account) = self.document.users.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        account.enabled = enabled;

        if let Err(err) = self.write_back() {
            warn!(account_id = id, error = %err, "could not persist account state");
        }
        true
    }

    fn write_back(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content =
            serde_json::to_string_pretty(&self.document).map_err(|source| StorageError::Json {
                key: path.display().to_string(),
                source,
            })?;
        fs::write(path, content).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })
    }
}
