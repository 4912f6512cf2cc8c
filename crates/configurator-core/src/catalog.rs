//! Discovery of the emulator's per-service `.config` files

use crate::ConfigError;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

pub const SERVER_CONFIG_EXTENSION: &str = "config";

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFileStatus {
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfigFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Local>>,
    pub status: ConfigFileStatus,
}

impl ServerConfigFile {
    pub fn is_valid(&self) -> bool {
        self.status == ConfigFileStatus::Valid
    }

    /// The service name the emulator looks this file up by, e.g. `device`
    /// for `device.config`.
    pub fn service_name(&self) -> &str {
        self.name
            .strip_suffix(SERVER_CONFIG_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(&self.name)
    }
}

/// List the `.config` files directly inside `dir`, sorted by file name.
///
/// Each file is parsed as JSON; a file that fails to parse is still listed
/// with [`ConfigFileStatus::Invalid`].
pub async fn scan_server_configs(dir: &Path) -> Result<Vec<ServerConfigFile>, ConfigError> {
    let metadata = tokio::fs::metadata(dir).await?;
    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory(dir.display().to_string()));
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SERVER_CONFIG_EXTENSION) {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }

        let status = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(_) => ConfigFileStatus::Valid,
                Err(e) => ConfigFileStatus::Invalid(e.to_string()),
            },
            Err(e) => ConfigFileStatus::Invalid(e.to_string()),
        };

        files.push(ServerConfigFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            status,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!("Found {} server config files in {}", files.len(), dir.display());
    Ok(files)
}

/// Read one server config file and return it pretty-printed.
pub async fn read_server_config(path: &Path) -> Result<String, ConfigError> {
    let content = tokio::fs::read_to_string(path).await?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
