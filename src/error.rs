use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The process table itself could not be opened. Fatal to one poll only.
#[derive(Debug, Error)]
#[error("cannot open process table at {}: {source}", path.display())]
pub struct EnumerationError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("`{tool}` is not installed or not on PATH")]
    MissingTool { tool: &'static str },

    #[error("host `{0}` is not a remote host")]
    NotRemote(String),

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to write session script: {0}")]
    Script(#[source] io::Error),

    #[error("remote session timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("remote session I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("process listing on `{host}` failed with status {status}")]
    RemoteStatus { host: String, status: i32 },
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid pid {0}: nothing to target")]
    InvalidPid(i32),

    #[error("process {0} not found")]
    NotFound(i32),

    #[error("failed to send {signal} to PID {pid} (permission denied?)")]
    SignalFailed { pid: i32, signal: &'static str },

    #[error("{signal} is not supported on this platform")]
    Unsupported { signal: &'static str },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("remote command on `{host}` exited with status {status}")]
    RemoteStatus { host: String, status: i32 },

    #[error("remote action not confirmed: {reason}")]
    Verification { reason: String },
}
