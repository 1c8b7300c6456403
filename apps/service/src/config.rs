use std::{env, fmt, fs, io, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config {path}: {source}")]
    ReadFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to write config {path}: {source}")]
    WriteFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config directory available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub smtp: SmtpConfig,
}

/// Subscriber registry location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Status store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
}

/// Outgoing mail relay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub subject: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "downtrack.db".into() }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self { url: "redis://127.0.0.1:6379".into() }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            subject: "Downtime Tracker".into(),
        }
    }
}

impl SmtpConfig {
    /// Names of required settings that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
            ("from", &self.from),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/downtrack/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("downtrack/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let password = if self.smtp.password.is_empty() { "<unset>" } else { "********" };

        writeln!(f, "Current Configuration State:")?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path)?;
        write_title_1(f, "Redis")?;
        write_1(f, "URL", &self.redis.url)?;
        write_title_1(f, "SMTP")?;
        write_1(f, "Host", &self.smtp.host)?;
        write_1(f, "Port", &self.smtp.port)?;
        write_1(f, "Username", &self.smtp.username)?;
        write_1(f, "Password", &password)?;
        write_1(f, "From", &self.smtp.from)?;
        write_1(f, "Subject", &self.smtp.subject)?;

        Ok(())
    }
}

impl Config {
    /// Load the config file, then apply environment overrides
    pub fn load(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let mut config = Self::from_config(optional_path)?;
        config.apply_overrides(|name| env::var(name).ok());
        Ok(config)
    }

    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/downtrack/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| Error::ReadFailed { path: config_path.clone(), source })?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| Error::WriteFailed { path: path.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| Error::WriteFailed { path: path.to_path_buf(), source })
    }

    /// Environment variables take precedence over the file
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, name: &str| {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *target = value;
            }
        };

        set(&mut self.database.path, "DATABASE_PATH");
        set(&mut self.redis.url, "REDIS_URL");
        set(&mut self.smtp.host, "SMTP_HOST");
        set(&mut self.smtp.username, "SMTP_USER");
        set(&mut self.smtp.password, "SMTP_PASS");
        set(&mut self.smtp.from, "SMTP_FROM");

        if let Some(raw) = lookup("SMTP_PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => self.smtp.port = port,
                _ => warn!("Ignoring invalid SMTP_PORT {:?}, keeping {}", raw, self.smtp.port),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_written_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config");

        let config = Config::from_config(Some(&path)).unwrap();
        assert_eq!(config.smtp.port, 587);
        assert!(dir.path().join("nested/config.toml").exists());

        // Reading it back gives the same values
        let again = Config::from_config(Some(&path)).unwrap();
        assert_eq!(again.redis.url, config.redis.url);
        assert_eq!(again.database.path, "downtrack.db");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[smtp]\nhost = \"mail.example.com\"\nport = 465\n").unwrap();

        let config = Config::from_config(Some(&path)).unwrap();
        assert_eq!(config.smtp.host, "mail.example.com");
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.subject, "Downtime Tracker");
        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("REDIS_URL", "redis://cache:6379/2"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USER", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.smtp.username = "from-file".into();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.redis.url, "redis://cache:6379/2");
        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.smtp.username, "from-file", "empty values do not override");
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| (name == "SMTP_PORT").then(|| "smtp".to_string()));
        assert_eq!(config.smtp.port, 587);
    }

    #[test]
    fn test_display_masks_password() {
        let mut config = Config::default();
        config.smtp.password = "hunter2".into();
        let rendered = config.to_string();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("********"));
    }

    #[test]
    fn test_missing_smtp_fields() {
        let mut smtp = SmtpConfig::default();
        assert_eq!(smtp.missing_fields(), vec!["host", "username", "password", "from"]);
        smtp.host = "mail".into();
        smtp.username = "u".into();
        smtp.password = "p".into();
        smtp.from = "alerts@example.com".into();
        assert!(smtp.missing_fields().is_empty());
    }
}
