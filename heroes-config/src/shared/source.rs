use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Location of the remote people API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceApiConfig {
    /// Base URL of the API. Person lookups are issued against `{base_url}/people/{id}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl SourceApiConfig {
    /// Default base URL of the people API.
    pub const DEFAULT_BASE_URL: &'static str = "https://swapi.tech/api";

    /// Validates the source API settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "source.base_url".to_string(),
                constraint: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for SourceApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    SourceApiConfig::DEFAULT_BASE_URL.to_string()
}
