use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use super::config::HostConfig;

/// Total hosts, the implicit local entry included.
pub const MAX_HOSTS: usize = 10;

/// The configured hosts and the one currently on screen. Index 0 is always
/// the local host.
#[derive(Debug)]
pub struct HostRegistry {
    hosts: Vec<HostConfig>,
    current: usize,
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::local_only()
    }
}

impl HostRegistry {
    pub fn local_only() -> Self {
        HostRegistry {
            hosts: vec![HostConfig::local()],
            current: 0,
        }
    }

    /// Loads a host file. A missing or unreadable source yields the local
    /// host alone.
    pub fn load(source: Option<&Path>) -> Self {
        let Some(path) = source else {
            return Self::local_only();
        };
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_lines(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no host file; local host only");
                Self::local_only()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "host file unreadable; local host only");
                Self::local_only()
            }
        }
    }

    pub fn from_lines(contents: &str) -> Self {
        let mut registry = Self::local_only();
        for (lineno, raw) in contents.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            if registry.hosts.len() >= MAX_HOSTS {
                warn!(max = MAX_HOSTS, "host capacity reached; remaining lines ignored");
                break;
            }
            match HostConfig::parse_line(line) {
                Some(host) => registry.hosts.push(host),
                None => debug!(line = lineno + 1, "malformed host line skipped"),
            }
        }
        registry
    }

    /// Appends a host; returns false once the registry is full.
    pub fn push(&mut self, host: HostConfig) -> bool {
        if self.hosts.len() >= MAX_HOSTS {
            return false;
        }
        self.hosts.push(host);
        true
    }

    pub fn current(&self) -> &HostConfig {
        &self.hosts[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn hosts(&self) -> &[HostConfig] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Never true: the local host is always present.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.hosts.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn select_next(&mut self) {
        self.current = (self.current + 1) % self.hosts.len();
    }

    pub fn select_previous(&mut self) {
        self.current = (self.current + self.hosts.len() - 1) % self.hosts.len();
    }
}
