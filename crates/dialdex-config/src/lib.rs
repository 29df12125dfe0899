use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "dialdex";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_RESULT_LIMIT: i64 = 5000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    pub result_limit: i64,
}

/// Connection parameters for the remote object endpoint. The password is a
/// credential secret, hence the strict file-permission check below.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub url: String,
    pub database: String,
    pub user_id: i64,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("endpoint {field} must not be empty")]
    EmptyEndpointField { field: &'static str },
    #[error("invalid user_id value: {0}")]
    InvalidUserId(i64),
    #[error("invalid result_limit value: {0}")]
    InvalidResultLimit(i64),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    endpoint: EndpointFile,
    result_limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EndpointFile {
    url: String,
    database: String,
    user_id: i64,
    password: String,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(config_path)?;
    load_at_path(&path)
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    merge_config(parsed)
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let EndpointFile {
        url,
        database,
        user_id,
        password,
    } = parsed.endpoint;

    if url.trim().is_empty() {
        return Err(ConfigError::EmptyEndpointField { field: "url" });
    }
    if database.trim().is_empty() {
        return Err(ConfigError::EmptyEndpointField { field: "database" });
    }
    if password.is_empty() {
        return Err(ConfigError::EmptyEndpointField { field: "password" });
    }
    if user_id <= 0 {
        return Err(ConfigError::InvalidUserId(user_id));
    }

    let result_limit = match parsed.result_limit {
        Some(limit) => {
            if limit <= 0 {
                return Err(ConfigError::InvalidResultLimit(limit));
            }
            limit
        }
        None => DEFAULT_RESULT_LIMIT,
    };

    Ok(AppConfig {
        endpoint: EndpointConfig {
            url,
            database,
            user_id,
            password,
        },
        result_limit,
    })
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
