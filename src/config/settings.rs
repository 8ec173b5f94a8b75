use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::storage::StorageOptions;

/// Storage wrapper settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub wrap: bool,
    pub circular_dependency: bool,
    pub skip_undefined: bool,
    pub expire: bool,
}

impl Settings {
    /// Loads settings, letting `JSORB_*` environment variables override the
    /// defaults (e.g. `JSORB_EXPIRE=true`).
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            // Adding default values
            .set_default("wrap", true)?
            .set_default("circular_dependency", false)?
            .set_default("skip_undefined", false)?
            .set_default("expire", false)?
            .add_source(Environment::with_prefix("JSORB").try_parsing(true))
            .build()?;

        cfg.try_deserialize()
    }
}

impl From<Settings> for StorageOptions {
    fn from(settings: Settings) -> Self {
        Self {
            wrap: settings.wrap,
            circular_dependency: settings.circular_dependency,
            skip_undefined: settings.skip_undefined,
            expire: settings.expire,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Defaults mirror the storage wrapper defaults.
    #[test]
    fn test_defaults() {
        let settings = Settings::load().unwrap();
        let options = StorageOptions::from(settings);
        assert_eq!(options, StorageOptions::default());
    }
}
