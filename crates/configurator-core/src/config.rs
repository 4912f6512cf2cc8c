//! Persisted user configuration for the configurator

use crate::ConfigError;
use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const APP_CONFIG_FILENAME: &str = "configurator.ini";
pub const APP_CONFIG_SECTION: &str = "OnvifServerEmulator";
pub const SERVER_CONFIGS_KEY: &str = "serverConfigs";

/// User settings backed by an INI file.
///
/// Only `serverConfigs` in the `OnvifServerEmulator` section is interpreted.
/// Everything else found in the file is kept in `document` and written back
/// unchanged by [`UserConfigs::save`].
#[derive(Debug)]
pub struct UserConfigs {
    server_configs_dir: String,
    document: Ini,
    path: PathBuf,
}

impl Default for UserConfigs {
    fn default() -> Self {
        Self::with_path(APP_CONFIG_FILENAME)
    }
}

impl UserConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            server_configs_dir: String::new(),
            document: Ini::new(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn server_configs_dir(&self) -> &str {
        &self.server_configs_dir
    }

    pub fn set_server_configs_dir(&mut self, dir: impl Into<String>) {
        self.server_configs_dir = dir.into();
    }

    pub fn has_server_configs_dir(&self) -> bool {
        !self.server_configs_dir.is_empty()
    }

    /// Restore the stored configuration.
    ///
    /// A missing file, section or key is not an error: the in-memory value
    /// is simply left as it was.
    pub async fn load(&mut self) -> Result<(), ConfigError> {
        if !self.path.exists() {
            tracing::debug!("No user config at {}", self.path.display());
            return Ok(());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        self.document = Ini::load_from_str_opt(&content, Self::parse_options())?;

        if let Some(dir) = self
            .document
            .get_from(Some(APP_CONFIG_SECTION), SERVER_CONFIGS_KEY)
        {
            self.server_configs_dir = decode_value(dir);
        }

        tracing::debug!(
            "Loaded user config from {}: serverConfigs={:?}",
            self.path.display(),
            self.server_configs_dir
        );
        Ok(())
    }

    /// Write the current value back, creating the section if needed and
    /// overwriting the file in place.
    pub async fn save(&mut self) -> Result<(), ConfigError> {
        self.document
            .with_section(Some(APP_CONFIG_SECTION))
            .set(SERVER_CONFIGS_KEY, encode_value(&self.server_configs_dir));

        let mut buffer = Vec::new();
        self.document
            .write_to_opt(&mut buffer, Self::write_options())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, buffer).await?;

        tracing::info!("User config saved to {}", self.path.display());
        Ok(())
    }

    // Paths are stored verbatim, so Windows backslashes and quotes survive.
    fn parse_options() -> ParseOption {
        ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        }
    }

    fn write_options() -> WriteOption {
        WriteOption {
            escape_policy: EscapePolicy::Nothing,
            kv_separator: " = ",
            ..WriteOption::default()
        }
    }
}

/// Percent-encode the characters the INI reader would not give back as
/// written: `%` itself, line breaks, a trailing backslash (read as a line
/// continuation) and whitespace at either end (trimmed). Everything else,
/// including backslashes inside Windows paths, is stored as is.
fn encode_value(value: &str) -> String {
    let count = value.chars().count();
    let mut encoded = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        let at_edge = i == 0 || i + 1 == count;
        let escape = match c {
            '%' | '\n' | '\r' => true,
            '\\' => i + 1 == count,
            c if c.is_whitespace() => at_edge,
            _ => false,
        };
        if escape {
            let mut utf8 = [0u8; 4];
            for byte in c.encode_utf8(&mut utf8).bytes() {
                let _ = write!(encoded, "%{byte:02X}");
            }
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Inverse of [`encode_value`]. A `%` not followed by two hex digits is kept
/// literally, so hand-written values still load.
fn decode_value(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            decoded.push((hex_value(bytes[i + 1]) << 4) | hex_value(bytes[i + 2]));
            i += 3;
            continue;
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(decoded)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_missing_file_leaves_value_empty() {
        let dir = tempdir().unwrap();
        let mut configs = UserConfigs::with_path(dir.path().join(APP_CONFIG_FILENAME));

        configs.load().await.unwrap();

        assert_eq!(configs.server_configs_dir(), "");
        assert!(!configs.has_server_configs_dir());
    }

    #[tokio::test]
    async fn test_save_then_load_returns_same_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);

        let mut configs = UserConfigs::with_path(&path);
        configs.set_server_configs_dir("/opt/onvif/server_configs");
        configs.save().await.unwrap();

        let mut reloaded = UserConfigs::with_path(&path);
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.server_configs_dir(), "/opt/onvif/server_configs");
    }

    #[tokio::test]
    async fn test_windows_path_is_stored_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);

        let mut configs = UserConfigs::with_path(&path);
        configs.set_server_configs_dir(r"C:\emulator\server_configs");
        configs.save().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r"C:\emulator\server_configs"));

        let mut reloaded = UserConfigs::with_path(&path);
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.server_configs_dir(), r"C:\emulator\server_configs");
    }

    #[tokio::test]
    async fn test_trailing_backslash_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);

        for value in [r"C:\", r"D:\", r"\\server\share\"] {
            let mut configs = UserConfigs::with_path(&path);
            configs.set_server_configs_dir(value);
            configs.save().await.unwrap();

            let mut reloaded = UserConfigs::with_path(&path);
            reloaded.load().await.unwrap();
            assert_eq!(reloaded.server_configs_dir(), value);
        }
    }

    #[tokio::test]
    async fn test_awkward_paths_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);
        std::fs::write(&path, "[Window]\nwidth = 800\n").unwrap();

        for value in ["/srv/x\ny", "/srv/x\r\ny", "  padded dir  ", "/srv/100%", "/srv/%41"] {
            let mut configs = UserConfigs::with_path(&path);
            configs.load().await.unwrap();
            configs.set_server_configs_dir(value);
            configs.save().await.unwrap();

            let mut reloaded = UserConfigs::with_path(&path);
            reloaded.load().await.unwrap();
            assert_eq!(reloaded.server_configs_dir(), value);
            assert_eq!(reloaded.document.get_from(Some("Window"), "width"), Some("800"));
        }
    }

    #[tokio::test]
    async fn test_hand_written_percent_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);
        std::fs::write(&path, "[OnvifServerEmulator]\nserverConfigs = /srv/50%off%\n").unwrap();

        let mut configs = UserConfigs::with_path(&path);
        configs.load().await.unwrap();

        assert_eq!(configs.server_configs_dir(), "/srv/50%off%");
    }

    #[tokio::test]
    async fn test_save_keeps_unrelated_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);
        std::fs::write(&path, "[Window]\nwidth = 800\n").unwrap();

        let mut configs = UserConfigs::with_path(&path);
        configs.load().await.unwrap();
        assert_eq!(configs.server_configs_dir(), "");

        configs.set_server_configs_dir("/srv/configs");
        configs.save().await.unwrap();

        let saved = Ini::load_from_file(&path).unwrap();
        assert_eq!(saved.get_from(Some("Window"), "width"), Some("800"));
        assert_eq!(
            saved.get_from(Some(APP_CONFIG_SECTION), SERVER_CONFIGS_KEY),
            Some("/srv/configs")
        );
    }

    #[tokio::test]
    async fn test_key_lookup_ignores_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);
        std::fs::write(&path, "[OnvifServerEmulator]\nserverconfigs = /data/configs\n").unwrap();

        let mut configs = UserConfigs::with_path(&path);
        configs.load().await.unwrap();

        assert_eq!(configs.server_configs_dir(), "/data/configs");
    }

    #[tokio::test]
    async fn test_section_without_key_leaves_value_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);
        std::fs::write(&path, "[OnvifServerEmulator]\nother = 1\n").unwrap();

        let mut configs = UserConfigs::with_path(&path);
        configs.load().await.unwrap();

        assert!(!configs.has_server_configs_dir());
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);
        std::fs::write(&path, "[OnvifServerEmulator\nserverConfigs = /x\n").unwrap();

        let mut configs = UserConfigs::with_path(&path);
        let err = configs.load().await.unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
        assert_eq!(configs.server_configs_dir(), "");
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join(APP_CONFIG_FILENAME);

        let mut configs = UserConfigs::with_path(&path);
        configs.set_server_configs_dir("/srv/configs");
        configs.save().await.unwrap();

        assert!(path.exists());
    }
}
