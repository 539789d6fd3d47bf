use std::path::PathBuf;
use thiserror::Error;

// Login failures. Display is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Credenciales inválidas")]
    InvalidCredentials,
    #[error("Cuenta por activarse")]
    NotYetActive,
    #[error("Cuenta deshabilitada")]
    Disabled,
    #[error("Cuenta vencida")]
    Expired { account_id: String },
}

// Rejected shift entries, shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftError {
    #[error("Selecciona un empleado")]
    MissingEmployee,
    #[error("Día inválido: {0}")]
    InvalidDay(u8),
    #[error("Hora inválida: {0}")]
    InvalidTime(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json for key '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no {0} directory available on this platform")]
    MissingDir(&'static str),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_messages() {
        assert_eq!(
            LoginError::InvalidCredentials.to_string(),
            "Credenciales inválidas"
        );
        assert_eq!(LoginError::NotYetActive.to_string(), "Cuenta por activarse");
        assert_eq!(LoginError::Disabled.to_string(), "Cuenta deshabilitada");
        assert_eq!(
            LoginError::Expired {
                account_id: "1".to_string()
            }
            .to_string(),
            "Cuenta vencida"
        );
    }
}
