use async_once_cell::OnceCell;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use super::{CLI_NAME, DATABASE_NAME, DATABASE_URL, PORT};

lazy_static! {
    pub static ref SETTINGS: Arc<OnceCell<Settings>> = Arc::new(OnceCell::new());
}

static DEFAULT_DB_NAME: &str = "tracks";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not locate program directories")]
    Directories,

    #[error("Could not access {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for environment variable {0}: {1:?}")]
    Env(&'static str, String),

    #[error("Database path is not valid UTF-8: {0:?}")]
    Path(PathBuf),

    #[error("Settings have not been loaded")]
    Uninitialized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub db: String,
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db: String::new(),
            db_name: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

pub fn get_settings() -> Result<&'static Settings, SettingsError> {
    SETTINGS.get().ok_or(SettingsError::Uninitialized)
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8000
}

fn project_dirs() -> Result<ProjectDirs, SettingsError> {
    ProjectDirs::from("com", "github", CLI_NAME).ok_or(SettingsError::Directories)
}

/// Reads an environment variable, treating an empty value as unset.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

pub fn load(path: Option<PathBuf>) -> Result<Settings, SettingsError> {
    let path = match path {
        Some(path) => path,
        None => project_dirs()?.config_dir().join("config.toml"),
    };
    tracing::info! {?path, "Loading config file"};
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(SettingsError::Io(path, e)),
    };
    let mut set: Settings = toml::from_str(content.as_str())?;
    set = apply_env(set, env_var)?;
    set = generate_default(set)?;
    tracing::trace! {settings = ?set, "Loaded settings"};
    Ok(set)
}

/// Overrides file values with `PORT`, `DATABASE_URL` and `DATABASE_NAME`.
pub fn apply_env<F>(mut set: Settings, var: F) -> Result<Settings, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = var(PORT) {
        set.port = port.parse().map_err(|_| SettingsError::Env(PORT, port))?;
    }
    if let Some(url) = var(DATABASE_URL) {
        set.db = url;
    }
    if let Some(name) = var(DATABASE_NAME) {
        set.db_name = Some(name);
    }
    Ok(set)
}

pub fn generate_default(mut set: Settings) -> Result<Settings, SettingsError> {
    if set.db == String::default() {
        let dir = project_dirs()?.data_dir().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| SettingsError::Io(dir.clone(), e))?;
        set.db = sqlite_url(dir.join(format!(
            "{}.db",
            set.db_name.as_deref().unwrap_or(DEFAULT_DB_NAME)
        )))?;
    }
    Ok(set)
}

fn sqlite_url(file: PathBuf) -> Result<String, SettingsError> {
    match file.to_str() {
        Some(path) => Ok(format!("sqlite://{}?mode=rwc", path)),
        None => Err(SettingsError::Path(file)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let set: Settings = toml::from_str("").unwrap();
        assert_eq!(set, Settings::default());
        assert_eq!(set.port, 8000);
        assert_eq!(set.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn file_values_are_read() {
        let set: Settings = toml::from_str(
            r#"
            db = "postgres://localhost/music"
            host = "127.0.0.1"
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(set.db, "postgres://localhost/music");
        assert_eq!(set.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(set.port, 9000);
    }

    #[test]
    fn environment_overrides_file() {
        let file = Settings {
            db: "sqlite://file.db".to_string(),
            port: 9000,
            ..Settings::default()
        };
        let set = apply_env(
            file,
            vars(&[
                (PORT, "8080"),
                (DATABASE_URL, "postgres://db/music"),
                (DATABASE_NAME, "music"),
            ]),
        )
        .unwrap();
        assert_eq!(set.port, 8080);
        assert_eq!(set.db, "postgres://db/music");
        assert_eq!(set.db_name.as_deref(), Some("music"));
    }

    #[test]
    fn missing_environment_keeps_file() {
        let file = Settings {
            port: 9000,
            ..Settings::default()
        };
        let set = apply_env(file.clone(), vars(&[])).unwrap();
        assert_eq!(set, file);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = apply_env(Settings::default(), vars(&[(PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, SettingsError::Env(PORT, ref v) if v == "eighty"));
    }

    #[test]
    fn explicit_db_is_kept() {
        let set = generate_default(Settings {
            db: "postgres://db/music".to_string(),
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(set.db, "postgres://db/music");
    }

    #[tokio::test]
    async fn settings_are_read_once_loaded() {
        assert!(matches!(get_settings(), Err(SettingsError::Uninitialized)));
        let loaded = Settings {
            db: "sqlite://file.db".to_string(),
            port: 9000,
            ..Settings::default()
        };
        SETTINGS.get_or_init(async { loaded.clone() }).await;
        assert_eq!(get_settings().unwrap(), &loaded);
    }

    #[test]
    fn sqlite_url_format() {
        let url = sqlite_url(PathBuf::from("/data/music.db")).unwrap();
        assert_eq!(url, "sqlite:///data/music.db?mode=rwc");
    }
}
