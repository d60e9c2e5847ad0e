use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub remote: RemoteConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_rate_ms: u64,
    pub poll_every_ticks: u32,
    pub hosts_file: Option<PathBuf>,
    pub show_kernel_threads: bool,
    pub default_sort: String,
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            tick_rate_ms: 50,
            poll_every_ticks: 10,
            hosts_file: None,
            show_kernel_threads: true,
            default_sort: "cpu".to_string(),
            log_file: None,
        }
    }
}

impl GeneralConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub connect_timeout_secs: u64,
    pub command_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            connect_timeout_secs: 3,
            command_timeout_secs: 5,
        }
    }
}

impl RemoteConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub pause: String,
    pub resume: String,
    pub kill: String,
    pub restart: String,
    pub next_host: String,
    pub previous_host: String,
    pub filter: String,
    pub help: String,
    pub toggle_kernel: String,
    pub cycle_sort: String,
    pub refresh: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            pause: "p".to_string(),
            resume: "r".to_string(),
            kill: "k".to_string(),
            restart: "R".to_string(),
            next_host: "n".to_string(),
            previous_host: "N".to_string(),
            filter: "/".to_string(),
            help: "?".to_string(),
            toggle_kernel: "t".to_string(),
            cycle_sort: "s".to_string(),
            refresh: "F5".to_string(),
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostop"))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Where the host list is read from when neither the command line nor the
/// config file names one.
pub fn default_hosts_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("hosts.conf"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
