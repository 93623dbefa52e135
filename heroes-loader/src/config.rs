use heroes_config::shared::LoaderConfig;
use heroes_config::{LoadConfigError, load_config};

/// Loads the loader configuration from the `configuration/` directory and `APP_`-prefixed
/// environment overrides.
pub fn load_loader_config() -> Result<LoaderConfig, LoadConfigError> {
    load_config::<LoaderConfig>()
}
