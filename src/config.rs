use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub youtrack: Option<YouTrackConfig>,
    pub files: Option<FilesConfig>,
}

#[derive(Debug, Deserialize)]
pub struct YouTrackConfig {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct FilesConfig {
    pub directory: Option<String>,
}

impl AppConfig {
    /// Directory holding the tracked `.yt` files. Defaults to
    /// `~/.yt-files/files` unless configured.
    pub fn files_dir(&self) -> PathBuf {
        self.files
            .as_ref()
            .and_then(|f| f.directory.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir().join("files"))
    }
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".yt-files")
}

pub fn load_config() -> Result<AppConfig> {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.youtrack.is_none());
        assert!(config.files.is_none());
    }

    #[test]
    fn full_config_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[youtrack]\nbase_url = \"https://yt.example.test\"\ntoken = \"secret\"\n\n[files]\ndirectory = \"/tmp/yt\"\n",
        )
        .unwrap();

        let config = load_from(&path).unwrap();
        let youtrack = config.youtrack.as_ref().unwrap();
        assert_eq!(youtrack.base_url, "https://yt.example.test");
        assert_eq!(youtrack.token, "secret");
        assert_eq!(config.files_dir(), PathBuf::from("/tmp/yt"));
    }

    #[test]
    fn files_dir_defaults_under_data_dir() {
        let config = AppConfig::default();
        assert!(config.files_dir().ends_with(".yt-files/files"));
    }

    #[test]
    fn broken_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[youtrack\n").unwrap();
        assert!(load_from(&path).is_err());
    }
}
