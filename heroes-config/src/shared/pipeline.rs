use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Identifier range to fetch from the remote API, both ends inclusive.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RangeConfig {
    /// First identifier of the range.
    #[serde(default = "default_range_first")]
    pub first: i32,
    /// Last identifier of the range.
    #[serde(default = "default_range_last")]
    pub last: i32,
}

impl RangeConfig {
    /// Default first identifier.
    pub const DEFAULT_FIRST: i32 = 1;

    /// Default last identifier.
    pub const DEFAULT_LAST: i32 = 79;

    /// Validates the range settings.
    ///
    /// Identifiers are positive and the range must not be inverted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first < 1 {
            return Err(ValidationError::InvalidFieldValue {
                field: "range.first".to_string(),
                constraint: "must be at least 1".to_string(),
            });
        }

        if self.last < self.first {
            return Err(ValidationError::InvalidFieldValue {
                field: "range.last".to_string(),
                constraint: "must not be smaller than `range.first`".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            first: default_range_first(),
            last: default_range_last(),
        }
    }
}

fn default_range_first() -> i32 {
    RangeConfig::DEFAULT_FIRST
}

fn default_range_last() -> i32 {
    RangeConfig::DEFAULT_LAST
}

/// Fetch window configuration.
///
/// The window size bounds how many HTTP requests are in flight at once; windows are
/// processed one after another.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WindowConfig {
    /// Maximum number of identifiers fetched concurrently in one window.
    #[serde(default = "default_window_max_size")]
    pub max_size: usize,
}

impl WindowConfig {
    /// Default maximum window size.
    pub const DEFAULT_MAX_SIZE: usize = 40;

    /// Validates window configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_size == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "window.max_size".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_size: default_window_max_size(),
        }
    }
}

fn default_window_max_size() -> usize {
    WindowConfig::DEFAULT_MAX_SIZE
}

/// Insert batch configuration.
///
/// The batch size bounds how many records are written per transaction. It is independent
/// of the fetch window size.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchConfig {
    /// Maximum number of records in one persisted batch.
    #[serde(default = "default_batch_max_size")]
    pub max_size: usize,
}

impl BatchConfig {
    /// Default maximum batch size.
    pub const DEFAULT_MAX_SIZE: usize = 40;

    /// Validates batch configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_size == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "batch.max_size".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: default_batch_max_size(),
        }
    }
}

fn default_batch_max_size() -> usize {
    BatchConfig::DEFAULT_MAX_SIZE
}

/// Configuration for one pipeline run.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Identifier range to fetch.
    #[serde(default)]
    pub range: RangeConfig,
    /// Fetch window settings.
    #[serde(default)]
    pub window: WindowConfig,
    /// Insert batch settings.
    #[serde(default)]
    pub batch: BatchConfig,
}

impl PipelineConfig {
    /// Validates all pipeline settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.range.validate()?;
        self.window.validate()?;
        self.batch.validate()?;

        Ok(())
    }
}
