use crate::error::ApiError;
use crate::models::Account;
use reqwest::Client;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub async fn fetch_accounts(api_url: &str) -> Result<Vec<Account>, ApiError> {
    let client = Client::new();
    let url = format!("{}/api/usuarios", api_url);

    let res = client.get(&url).send().await?;

    if res.status().is_success() {
        Ok(res.json::<Vec<Account>>().await?)
    } else {
        let status = res.status();
        let body = res.text().await?;
        Err(ApiError::Status { status, body })
    }
}

// URL and JSON body of the account state update
pub fn account_state_request(
    api_url: &str,
    account_id: &str,
    new_state: bool,
) -> (String, serde_json::Value) {
    (
        format!("{}/api/usuarios/{}/edocuenta", api_url, account_id),
        json!({ "newState": new_state }),
    )
}

pub async fn update_account_state(
    api_url: &str,
    account_id: &str,
    new_state: bool,
) -> Result<(), ApiError> {
    let client = Client::new();
    let (url, body) = account_state_request(api_url, account_id, new_state);

    let res = client.put(&url).json(&body).send().await?;

    if res.status().is_success() {
        Ok(())
    } else {
        let status = res.status();
        let body = res.text().await?;
        Err(ApiError::Status { status, body })
    }
}

/// Told about account state changes made by the login flow.
pub trait AccountStatusNotifier {
    fn account_state_changed(&self, account_id: &str, enabled: bool);
}

// Pushes state changes to the account backend without waiting for them
pub struct RemoteStatusNotifier {
    api_url: String,
    runtime: tokio::runtime::Handle,
}

impl RemoteStatusNotifier {
    pub fn new(api_url: impl Into<String>, runtime: tokio::runtime::Handle) -> RemoteStatusNotifier {
        RemoteStatusNotifier {
            api_url: api_url.into(),
            runtime,
        }
    }
}

impl RemoteStatusNotifier {
    fn spawn_update(&self, account_id: &str, enabled: bool) -> JoinHandle<()> {
        let api_url = self.api_url.clone();
        let account_id = account_id.to_string();
        self.runtime.spawn(async move {
            match update_account_state(&api_url, &account_id, enabled).await {
                Ok(()) => debug!(%account_id, enabled, "account state updated"),
                Err(err) => warn!(%account_id, error = %err, "account state update failed"),
            }
        })
    }
}

impl AccountStatusNotifier for RemoteStatusNotifier {
    fn account_state_changed(&self, account_id: &str, enabled: bool) {
        self.spawn_update(account_id, enabled);
    }
}

pub struct NoopNotifier;

impl AccountStatusNotifier for NoopNotifier {
    fn account_state_changed(&self, _account_id: &str, _enabled: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_account_state_unreachable_backend() {
        // Port 9 (discard) is not expected to serve HTTP
        let result = update_account_state("http://127.0.0.1:9", "1", false).await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }

    #[test]
    fn test_account_state_request() {
        let (url, body) = account_state_request("http://localhost:3001", "42", false);
        assert_eq!(url, "http://localhost:3001/api/usuarios/42/edocuenta");
        assert_eq!(body, json!({ "newState": false }));
        assert_eq!(body.to_string(), r#"{"newState":false}"#);
    }

    #[tokio::test]
    async fn test_fetch_accounts_unreachable_backend() {
        let result = fetch_accounts("http://127.0.0.1:9").await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }

    #[tokio::test]
    async fn test_remote_notifier_logs_failures_without_panicking() {
        let notifier =
            RemoteStatusNotifier::new("http://127.0.0.1:9", tokio::runtime::Handle::current());
        let handle = notifier.spawn_update("1", false);
        assert!(handle.await.is_ok());
    }
}
