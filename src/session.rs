use crate::accounts::AccountStore;
use crate::api::AccountStatusNotifier;
use crate::dates::{self, is_after_today, is_before_today};
use crate::error::LoginError;
use crate::models::Account;
use crate::storage::{self, Storage, TOKEN_KEY, USER_KEY};
use chrono::NaiveDate;
use std::rc::Rc;
use tracing::{info, warn};

/// Checks the activation window and enabled flag of `account`, in order:
/// not yet started, disabled past the end, expired, disabled.
///
/// A window bound that does not parse as a date does not restrict the
/// account.
pub fn evaluate_window(account: &Account, today: NaiveDate) -> Result<(), LoginError> {
    let starts_later = bound_check(is_after_today(&account.starts_at, today), account, "FecIni");
    let ended = bound_check(is_before_today(&account.ends_at, today), account, "FecFin");

    if starts_later {
        return Err(LoginError::NotYetActive);
    }
    if !account.enabled && ended {
        return Err(LoginError::Disabled);
    }
    if ended {
        return Err(LoginError::Expired {
            account_id: account.id.clone(),
        });
    }
    if !account.enabled {
        return Err(LoginError::Disabled);
    }
    Ok(())
}

fn bound_check(result: Option<bool>, account: &Account, field: &str) -> bool {
    match result {
        Some(hit) => hit,
        None => {
            warn!(account_id = %account.id, field, "unparseable activation date");
            false
        }
    }
}

/// Full gate for a known account: window first, password last.
pub fn evaluate(account: &Account, password: &str, today: NaiveDate) -> Result<(), LoginError> {
    evaluate_window(account, today)?;
    if account.password != password {
        return Err(LoginError::InvalidCredentials);
    }
    Ok(())
}

pub struct SessionManager {
    accounts: AccountStore,
    storage: Rc<dyn Storage>,
    notifier: Box<dyn AccountStatusNotifier>,
    user: Option<Account>,
    error: Option<LoginError>,
}

impl SessionManager {
    pub fn new(
        accounts: AccountStore,
        storage: Rc<dyn Storage>,
        notifier: Box<dyn AccountStatusNotifier>,
    ) -> SessionManager {
        SessionManager {
            accounts,
            storage,
            notifier,
            user: None,
            error: None,
        }
    }

    pub fn user(&self) -> Option<&Account> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn error(&self) -> Option<&LoginError> {
        self.error.as_ref()
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn login(&mut self, username: &str, password: &str) -> bool {
        self.login_on(username, password, dates::today()).is_ok()
    }

    pub fn login_on(
        &mut self,
        username: &str,
        password: &str,
        today: NaiveDate,
    ) -> Result<&Account, LoginError> {
        self.error = None;

        let outcome = match self.accounts.find_by_username(username) {
            Some(account) => evaluate(account, password, today).map(|()| account.clone()),
            None => Err(LoginError::InvalidCredentials),
        };

        match outcome {
            Ok(account) => {
                self.persist(&account);
                info!(username, "login succeeded");
                Ok(&*self.user.insert(account))
            }
            Err(err) => {
                if let LoginError::Expired { account_id } = &err {
                    self.expire_account(account_id);
                }
                self.logout();
                info!(username, reason = %err, "login rejected");
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) {
        self.user = None;
        self.error = None;
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "could not clear session storage");
            }
        }
    }

    /// Brings back a stored session if its account may still log in.
    pub fn restore_on(&mut self, today: NaiveDate) -> bool {
        let stored: Option<Account> = match storage::load_json(self.storage.as_ref(), USER_KEY) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "discarding unreadable session");
                None
            }
        };
        let Some(stored) = stored else {
            self.logout();
            return false;
        };

        // The accounts document is authoritative over the stored copy
        let Some(current) = self.accounts.get(&stored.id).cloned() else {
            info!(account_id = %stored.id, "stored session has no account");
            self.logout();
            return false;
        };
        match evaluate_window(&current, today) {
            Ok(()) => {
                self.persist(&current);
                self.user = Some(current);
                true
            }
            Err(err) => {
                if let LoginError::Expired { account_id } = &err {
                    self.expire_account(account_id);
                }
                info!(reason = %err, "stored session no longer valid");
                self.logout();
                false
            }
        }
    }

    pub fn restore(&mut self) -> bool {
        self.restore_on(dates::today())
    }

    fn expire_account(&mut self, account_id: &str) {
        if self.accounts.set_enabled(account_id, false) {
            self.notifier.account_state_changed(account_id, false);
        }
    }

    fn persist(&self, account: &Account) {
        if let Err(err) = self.storage.save(TOKEN_KEY, &account.jwt) {
            warn!(error = %err, "could not store session token");
        }
        if let Err(err) = storage::save_json(self.storage.as_ref(), USER_KEY, account) {
            warn!(error = %err, "could not store session user");
        }
    }
}
