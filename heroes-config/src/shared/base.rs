use thiserror::Error;

/// Errors raised when a configuration value fails validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field holds a value outside its accepted range.
    #[error("`{field}` is invalid: {constraint}")]
    InvalidFieldValue { field: String, constraint: String },
    /// TLS is enabled but no trusted root certificates are provided.
    #[error("Invalid TLS config: `trusted_root_certs` must be set when `enabled` is true")]
    MissingTrustedRootCerts,
}
