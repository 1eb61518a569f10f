use std::path::Path;

use config::Config;
use config::ConfigError;
use config::File;
use serde::Deserialize;

/// Driver settings for the batch runner
///
/// Every field has a default, so a partial (or missing) file still
/// yields a usable configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfigFile {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_path")]
    pub request_path: String,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: usize,

    #[serde(default = "default_max_parallelism")]
    pub max_parallelism: usize,

    #[serde(default = "default_total_requests")]
    pub total_requests: usize,
}

impl Default for DriverConfigFile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_path: default_request_path(),
            requests_per_second: default_requests_per_second(),
            max_parallelism: default_max_parallelism(),
            total_requests: default_total_requests(),
        }
    }
}

impl DriverConfigFile {
    /// Reject values no gate or batch should be built from
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests_per_second == 0 {
            return Err(ConfigError::Message("requests_per_second must be greater than zero".into()));
        }
        if self.max_parallelism == 0 {
            return Err(ConfigError::Message("max_parallelism must be greater than zero".into()));
        }
        if self.total_requests == 0 {
            return Err(ConfigError::Message("total_requests must be greater than zero".into()));
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}

fn default_request_path() -> String {
    "/todos/1".to_string()
}

fn default_requests_per_second() -> usize {
    10
}

fn default_max_parallelism() -> usize {
    2
}

fn default_total_requests() -> usize {
    100
}

pub fn load_driver_config<P: AsRef<Path>>(path: P) -> Result<DriverConfigFile, ConfigError> {
    let config = Config::builder().add_source(File::from(path.as_ref())).build()?;

    config.try_deserialize()
}

/// Load driver config with fallback to default
pub fn load_driver_config_or_default(path: &str) -> DriverConfigFile {
    match load_driver_config(path) {
        Ok(config) => {
            tracing::info!("Loaded driver config from {path}");
            config
        }
        Err(err) => {
            tracing::warn!("Failed to load driver config from {}: {}. Using defaults.", path, err);
            DriverConfigFile::default()
        }
    }
}
