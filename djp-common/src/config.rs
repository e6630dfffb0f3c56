//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the data root folder
pub const ROOT_ENV_VAR: &str = "DJP_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "djp.db";

/// Credentials used to bootstrap the default admin account on first run
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
    pub email: String,
    pub dj_name: String,
}

impl AdminBootstrap {
    /// Resolve bootstrap credentials from the environment, with compiled
    /// fallbacks suitable only for development.
    pub fn from_env() -> Self {
        Self {
            username: std::env::var("DJP_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            password: std::env::var("DJP_ADMIN_PASSWORD").unwrap_or_else(|_| "changeme".to_string()),
            email: std::env::var("DJP_ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string()),
            dj_name: "Coordinator".to_string(),
        }
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Path to the SQLite database inside the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// Locate the configuration file for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/djp/config.toml first, then /etc/djp/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("djp").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/djp/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("djp").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("djp"))
        .unwrap_or_else(|| PathBuf::from("./djp_data"))
}
