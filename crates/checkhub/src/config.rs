use std::time::Duration;
use std::{env, fmt, fs, io, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadFailed(#[source] io::Error),
    #[error("Failed to write config: {0}")]
    WriteFailed(#[source] io::Error),
    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("No config path available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub services: Services,
    pub dispatch: DispatchConfig,
}

/// Base URLs of the backend collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Services {
    pub checks: String,
    pub results: String,
    pub notifications: String,
    pub directory: String,
    /// Per-request timeout for the HTTP sources
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Directory prefix under which executors register, one subtree per route
    pub routes_path: String,
    /// Service name in a directory entry that exposes the executor endpoint
    pub service_name: String,
    /// Route shared by every tenant for checks against external hosts
    pub external_route: String,
    pub dial_timeout_ms: u64,
    /// How long an executor gets to answer a test request
    pub request_window_ms: u64,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            checks: "http://127.0.0.1:8081".into(),
            results: "http://127.0.0.1:8082".into(),
            notifications: "http://127.0.0.1:8083".into(),
            directory: "http://127.0.0.1:2379".into(),
            request_timeout_secs: 15,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            routes_path: "/checkhub/routes".into(),
            service_name: "checker".into(),
            external_route: "external-hosts".into(),
            dial_timeout_ms: 5_000,
            request_window_ms: 60_000,
        }
    }
}

impl Services {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl DispatchConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }

    pub fn request_window(&self) -> Duration {
        Duration::from_millis(self.request_window_ms)
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_request_window(mut self, window: Duration) -> Self {
        self.request_window_ms = window.as_millis() as u64;
        self
    }

    pub fn with_external_route(mut self, route: impl Into<String>) -> Self {
        self.external_route = route.into();
        self
    }

    pub fn with_routes_path(mut self, path: impl Into<String>) -> Self {
        self.routes_path = path.into();
        self
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

/// Get default config path ($XDG_CONFIG_HOME/checkhub/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Ok(home_dir) = env::var("HOME") {
        path::PathBuf::from(home_dir).join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("checkhub/config.toml"))
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

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Services")?;
        write_1(f, "Checks", &self.services.checks)?;
        write_1(f, "Results", &self.services.results)?;
        write_1(f, "Notifications", &self.services.notifications)?;
        write_1(f, "Directory", &self.services.directory)?;
        write_1(f, "Request Timeout (s)", &self.services.request_timeout_secs)?;
        write_title_1(f, "Dispatch")?;
        write_1(f, "Routes Path", &self.dispatch.routes_path)?;
        write_1(f, "Service Name", &self.dispatch.service_name)?;
        write_1(f, "External Route", &self.dispatch.external_route)?;
        write_1(f, "Dial Timeout (ms)", &self.dispatch.dial_timeout_ms)?;
        write_1(f, "Request Window (ms)", &self.dispatch.request_window_ms)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/checkhub/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```no_run
    /// let cfg = checkhub::Config::from_config(None::<&std::path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), checkhub::config::ConfigError>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::ReadFailed)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(ConfigError::WriteFailed)
    }
}
