use std::fmt;

pub const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionKind {
    SecureShell,
    Telnet,
    Local,
}

impl ConnectionKind {
    /// Unrecognized kinds fall back to local.
    pub fn from_config_str(s: &str) -> Self {
        match s.trim() {
            "ssh" => ConnectionKind::SecureShell,
            "telnet" => ConnectionKind::Telnet,
            _ => ConnectionKind::Local,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionKind::SecureShell => "ssh",
            ConnectionKind::Telnet => "telnet",
            ConnectionKind::Local => "local",
        }
    }
}

/// How commands for a host are actually carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Execution {
    Local,
    SecureShell,
    Telnet,
}

#[derive(Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub kind: ConnectionKind,
    pub is_local: bool,
}

impl HostConfig {
    /// The implicit entry for the machine we run on.
    pub fn local() -> Self {
        HostConfig {
            name: "localhost".to_string(),
            address: "127.0.0.1".to_string(),
            port: 0,
            username: String::new(),
            password: String::new(),
            kind: ConnectionKind::Local,
            is_local: true,
        }
    }

    pub fn remote(
        name: impl Into<String>,
        address: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        kind: ConnectionKind,
    ) -> Self {
        HostConfig {
            name: name.into(),
            address: address.into(),
            port,
            username: username.into(),
            password: password.into(),
            kind,
            is_local: false,
        }
    }

    /// Parses `name:address:port:username:password:type`. Empty fields are
    /// kept; lines with fewer than six fields yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 6 {
            return None;
        }
        Some(HostConfig::remote(
            fields[0],
            fields[1],
            parse_port(fields[2]),
            fields[3],
            fields[4],
            ConnectionKind::from_config_str(fields[5]),
        ))
    }

    /// A host flagged local, or configured with the local kind, runs in-process.
    pub fn execution(&self) -> Execution {
        if self.is_local {
            return Execution::Local;
        }
        match self.kind {
            ConnectionKind::SecureShell => Execution::SecureShell,
            ConnectionKind::Telnet => Execution::Telnet,
            ConnectionKind::Local => Execution::Local,
        }
    }

    /// `user@address`, or just the address when no user is configured.
    pub fn login_target(&self) -> String {
        if self.username.is_empty() {
            self.address.clone()
        } else {
            format!("{}@{}", self.username, self.address)
        }
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field(
                "password",
                &if self.password.is_empty() { "" } else { "<redacted>" },
            )
            .field("kind", &self.kind)
            .field("is_local", &self.is_local)
            .finish()
    }
}

/// Non-positive, unparsable or out-of-range ports become 22.
fn parse_port(raw: &str) -> u16 {
    match raw.trim().parse::<i64>() {
        Ok(port) if port > 0 && port <= i64::from(u16::MAX) => port as u16,
        _ => DEFAULT_SSH_PORT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_line_parses() {
        let host = HostConfig::parse_line("db:10.0.0.5:2222:alice:secret:ssh").unwrap();
        assert_eq!(host.name, "db");
        assert_eq!(host.address, "10.0.0.5");
        assert_eq!(host.port, 2222);
        assert_eq!(host.username, "alice");
        assert_eq!(host.password, "secret");
        assert_eq!(host.kind, ConnectionKind::SecureShell);
        assert!(!host.is_local);
        assert_eq!(host.execution(), Execution::SecureShell);
    }

    #[test]
    fn empty_fields_are_preserved() {
        let host = HostConfig::parse_line("web:10.0.0.6::bob::ssh").unwrap();
        assert_eq!(host.port, DEFAULT_SSH_PORT);
        assert_eq!(host.username, "bob");
        assert!(host.password.is_empty());
    }

    #[test]
    fn bad_ports_default_to_22() {
        for port in ["0", "-5", "abc", "70000"] {
            let line = format!("h:1.2.3.4:{port}:u:p:telnet");
            assert_eq!(HostConfig::parse_line(&line).unwrap().port, 22, "{port}");
        }
    }

    #[test]
    fn unknown_kind_executes_locally() {
        let host = HostConfig::parse_line("h:1.2.3.4:22:u:p:rdp").unwrap();
        assert_eq!(host.kind, ConnectionKind::Local);
        assert_eq!(host.execution(), Execution::Local);
    }

    #[test]
    fn short_lines_are_rejected() {
        assert!(HostConfig::parse_line("h:1.2.3.4:22:u").is_none());
    }

    #[test]
    fn local_flag_wins_over_kind() {
        let mut host = HostConfig::local();
        host.kind = ConnectionKind::SecureShell;
        assert_eq!(host.execution(), Execution::Local);
    }

    #[test]
    fn debug_output_redacts_password() {
        let host = HostConfig::remote("db", "10.0.0.5", 22, "alice", "hunter2", ConnectionKind::Telnet);
        let rendered = format!("{host:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn login_target_omits_empty_user() {
        let host = HostConfig::remote("db", "10.0.0.5", 22, "", "", ConnectionKind::SecureShell);
        assert_eq!(host.login_target(), "10.0.0.5");
    }
}
