use serde::Deserialize;

use crate::shared::{PgConnectionConfig, PipelineConfig, SourceApiConfig, ValidationError};

/// Top-level configuration for the heroes loader binary.
///
/// This intentionally does not implement [`serde::Serialize`] to avoid accidentally
/// leaking the destination credentials into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    /// Remote API the records are fetched from.
    #[serde(default)]
    pub source: SourceApiConfig,
    /// Postgres database the records are written to.
    pub destination: PgConnectionConfig,
    /// Pipeline range, window, and batch settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl LoaderConfig {
    /// Validates the whole loader configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.destination.validate()?;
        self.pipeline.validate()?;

        Ok(())
    }
}
