use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_server_url() -> String {
    "http://127.0.0.1/zm".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_export_root() -> String {
    "camctl-export".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Accept self-signed server certificates.
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_export_root")]
    pub export_root: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            user: String::new(),
            password: String::new(),
            timeout_seconds: default_timeout_seconds(),
            insecure: false,
            export_root: default_export_root(),
        }
    }
}

pub fn state_dir() -> PathBuf {
    std::env::var("CAMCTL_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("camctl")
        })
}

pub fn default_config_path() -> PathBuf {
    state_dir().join("config.json")
}

pub fn resolve_config_path(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(default_config_path)
}

fn apply_env_overrides(config: &mut ClientConfig) {
    if let Ok(url) = std::env::var("CAMCTL_URL") {
        if !url.trim().is_empty() {
            config.server_url = url;
        }
    }
    if let Ok(user) = std::env::var("CAMCTL_USER") {
        if !user.trim().is_empty() {
            config.user = user;
        }
    }
    if let Ok(password) = std::env::var("CAMCTL_PASSWORD") {
        if !password.is_empty() {
            config.password = password;
        }
    }
}

pub fn load_config(path: &Path) -> Result<ClientConfig> {
    let mut config = if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?
    } else {
        let config = ClientConfig::default();
        save_config(path, &config)?;
        config
    };
    if config.timeout_seconds == 0 {
        config.timeout_seconds = default_timeout_seconds();
    }
    if config.server_url.trim().is_empty() {
        config.server_url = default_server_url();
    }
    if config.export_root.trim().is_empty() {
        config.export_root = default_export_root();
    }
    apply_env_overrides(&mut config);
    Ok(config)
}

pub fn save_config(path: &Path, config: &ClientConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}
