use std::time::Duration;

use tracing::{info, warn};

use super::config::{Execution, HostConfig};
use crate::error::{ActionError, ListError};
use crate::remote::commands::{FALLBACK_LIST_COMMAND, LIST_COMMAND, action_command, parse_exit_code};
use crate::remote::parser;
use crate::remote::transport::{
    DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, RemoteTransport, ShellTransport,
};
use crate::system::enumerator::ProcessEnumerator;
use crate::system::process::ProcessRecord;
use crate::system::signal::{LocalSignals, SignalSender, Verb};

/// Lists and acts on processes of any configured host. Callers never need to
/// know whether a host is local or remote.
pub struct HostAgent<T = ShellTransport, S = LocalSignals> {
    enumerator: ProcessEnumerator,
    transport: T,
    signals: S,
    command_timeout: Duration,
}

impl Default for HostAgent {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_COMMAND_TIMEOUT)
    }
}

impl HostAgent {
    pub fn new(connect_timeout: Duration, command_timeout: Duration) -> Self {
        HostAgent::with_parts(
            ProcessEnumerator::new(),
            ShellTransport::new(connect_timeout),
            LocalSignals,
            command_timeout,
        )
    }

    /// Local listing from `enumerator`; remote hosts use the default clients.
    pub fn with_enumerator(enumerator: ProcessEnumerator, command_timeout: Duration) -> Self {
        HostAgent::with_parts(
            enumerator,
            ShellTransport::default(),
            LocalSignals,
            command_timeout,
        )
    }
}

impl<T: RemoteTransport, S: SignalSender> HostAgent<T, S> {
    pub fn with_parts(
        enumerator: ProcessEnumerator,
        transport: T,
        signals: S,
        command_timeout: Duration,
    ) -> Self {
        HostAgent {
            enumerator,
            transport,
            signals,
            command_timeout,
        }
    }

    pub fn enumerator(&self) -> &ProcessEnumerator {
        &self.enumerator
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn signals(&self) -> &S {
        &self.signals
    }

    pub fn list(&mut self, host: &HostConfig) -> Result<Vec<ProcessRecord>, ListError> {
        match host.execution() {
            Execution::Local => Ok(self.enumerator.list_local()?),
            Execution::SecureShell | Execution::Telnet => self.list_remote(host),
        }
    }

    pub fn act(&self, host: &HostConfig, pid: i32, verb: Verb) -> Result<(), ActionError> {
        if pid <= 0 {
            return Err(ActionError::InvalidPid(pid));
        }
        info!(host = %host.name, pid, verb = verb.label(), "process action");
        match host.execution() {
            Execution::Local => {
                for &signal in verb.signals() {
                    self.signals.send(pid as u32, signal)?;
                }
                Ok(())
            }
            Execution::SecureShell | Execution::Telnet => self.act_remote(host, pid, verb),
        }
    }

    fn list_remote(&self, host: &HostConfig) -> Result<Vec<ProcessRecord>, ListError> {
        let mut output = self
            .transport
            .execute(host, LIST_COMMAND, self.command_timeout)?;
        if !output.success() {
            warn!(host = %host.name, status = output.status, "listing failed; trying fallback");
            output = self
                .transport
                .execute(host, FALLBACK_LIST_COMMAND, self.command_timeout)?;
            if !output.success() {
                return Err(ListError::RemoteStatus {
                    host: host.name.clone(),
                    status: output.status,
                });
            }
        }
        Ok(parser::parse(&output.stdout))
    }

    fn act_remote(&self, host: &HostConfig, pid: i32, verb: Verb) -> Result<(), ActionError> {
        let command = action_command(verb, pid);
        let output = self
            .transport
            .execute(host, &command, self.command_timeout)?;
        if !output.success() {
            return Err(ActionError::RemoteStatus {
                host: host.name.clone(),
                status: output.status,
            });
        }
        match parse_exit_code(&output.stdout) {
            Some(0) => Ok(()),
            Some(code) => Err(ActionError::Verification {
                reason: format!("`{}` exited with {code}", verb.label()),
            }),
            None => Err(ActionError::Verification {
                reason: "no exit code in remote output".to_string(),
            }),
        }
    }
}
