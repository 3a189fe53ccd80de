use std::path::Path;

use figment::providers::{Format, Yaml};
use figment::Figment;
use schemars::{schema::RootSchema, schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::recorder::Config;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum FileConfig {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Config file for v1.0.0: logging plus the recorder settings.
#[derive(Deserialize, Serialize, Debug, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub recorder: Config,
}

impl ConfigV1 {
    /// Extracts a versioned config from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<ConfigV1, figment::Error> {
        match figment.extract::<FileConfig>()? {
            FileConfig::ConfigV1(c) => Ok(c),
        }
    }
}

/// Load config from a YAML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    ConfigV1::from_figment(Figment::new().merge(Yaml::file(path.as_ref())))
}

/// JSON schema of the configuration file.
pub fn config_schema() -> RootSchema {
    schema_for!(FileConfig)
}
