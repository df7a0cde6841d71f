use std::env;
use std::path::{Path, PathBuf};

use crate::device::{Credentials, Target};
use crate::error::ConfigError;

use super::canary_config::CanaryConfig;

const ROBOT_ADDRESS_VAR: &str = "ESP32_CANARY_ROBOT";
const API_KEY_VAR: &str = "ESP32_CANARY_API_KEY";
const API_KEY_ID_VAR: &str = "ESP32_CANARY_API_KEY_ID";
const MONGODB_URI_VAR: &str = "MONGODB_TEST_OUTPUT_URI";
const CONFIG_FILE_VAR: &str = "CONFIG_FILE";
const MIMIR_ENDPOINT_VAR: &str = "MIMIR_ENDPOINT";
const MIMIR_TENANT_VAR: &str = "MIMIR_TENANT";

const DEFAULT_CONFIG_FILE: &str = "canary.yml";

/// Everything the canary needs, resolved once at process start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub target: Target,
    pub mongodb_uri: String,
    pub canary: CanaryConfig,
    pub mimir: Option<MimirConfig>,
}

/// Where to export run metrics, if anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct MimirConfig {
    pub endpoint: String,
    pub tenant: Option<String>,
}

/// Load the application configuration from the environment and the optional YAML file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_from(|name| env::var(name).ok())
}

/// Build the configuration from an arbitrary variable lookup.
pub fn load_from<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let required = |name: &'static str| value(name).ok_or(ConfigError::Missing(name));

    let target = Target {
        address: normalize_address(&required(ROBOT_ADDRESS_VAR)?),
        credentials: Credentials {
            api_key: required(API_KEY_VAR)?,
            api_key_id: required(API_KEY_ID_VAR)?,
        },
    };
    let mongodb_uri = required(MONGODB_URI_VAR)?;

    let config_file = value(CONFIG_FILE_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let canary = read_canary_config(&config_file)?;

    let mimir = value(MIMIR_ENDPOINT_VAR).map(|endpoint| MimirConfig {
        endpoint: endpoint.trim_end_matches('/').to_string(),
        tenant: value(MIMIR_TENANT_VAR),
    });

    tracing::debug!(
        address = %target.address,
        config_file = %config_file.display(),
        mimir = mimir.is_some(),
        "configuration loaded"
    );

    Ok(AppConfig {
        target,
        mongodb_uri,
        canary,
        mimir,
    })
}

fn read_canary_config(path: &Path) -> Result<CanaryConfig, ConfigError> {
    let config = match std::fs::read_to_string(path) {
        Ok(contents) => {
            CanaryConfig::from_yaml(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CanaryConfig::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    config.validate()?;
    Ok(config)
}

/// Robot addresses are usually given as bare hosts; the transport needs a URL.
fn normalize_address(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.contains("://") {
        address.to_string()
    } else {
        format!("https://{address}")
    }
}
