use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::shared::ValidationError;

/// Connection settings for the Postgres database that receives fetched records.
///
/// This intentionally does not implement [`Serialize`] to avoid accidentally leaking the
/// password into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct PgConnectionConfig {
    /// Host on which Postgres is running.
    pub host: String,
    /// Port on which Postgres is running.
    pub port: u16,
    /// Name of the target database.
    pub name: String,
    /// User with which to connect.
    pub username: String,
    /// Password of the user, if password authentication is used.
    pub password: Option<SecretString>,
    /// TLS settings for the connection.
    pub tls: TlsConfig,
}

impl PgConnectionConfig {
    /// Validates the connection configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tls.enabled && self.tls.trusted_root_certs.is_empty() {
            return Err(ValidationError::MissingTrustedRootCerts);
        }

        Ok(())
    }

    /// Builds sqlx connect options for this configuration without selecting a database.
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.tls.enabled {
            PgSslMode::VerifyFull
        } else {
            PgSslMode::Prefer
        };

        let mut options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .ssl_mode(ssl_mode)
            .ssl_root_cert_from_pem(self.tls.trusted_root_certs.clone().into_bytes());

        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }

        options
    }

    /// Builds sqlx connect options for this configuration with the database selected.
    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.name)
    }
}

/// TLS settings for a Postgres connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// PEM-encoded trusted root certificates.
    pub trusted_root_certs: String,
    /// Whether to verify the server certificate.
    pub enabled: bool,
}

impl TlsConfig {
    /// Returns a configuration with TLS verification turned off.
    pub fn disabled() -> Self {
        Self {
            trusted_root_certs: String::new(),
            enabled: false,
        }
    }
}
