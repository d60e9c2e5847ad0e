use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};
use tracing::info;

use crate::error::ActionError;

/// The operator-facing process actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Pause,
    Resume,
    Kill,
    Restart,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Pause, Verb::Resume, Verb::Kill, Verb::Restart];

    pub fn label(self) -> &'static str {
        match self {
            Verb::Pause => "pause",
            Verb::Resume => "resume",
            Verb::Kill => "kill",
            Verb::Restart => "restart",
        }
    }

    /// Signals delivered, in order, for this verb.
    pub fn signals(self) -> &'static [Signal] {
        match self {
            Verb::Pause => &[Signal::Stop],
            Verb::Resume => &[Signal::Continue],
            Verb::Kill => &[Signal::Kill],
            Verb::Restart => &[Signal::Term, Signal::Continue],
        }
    }
}

pub fn signal_name(signal: Signal) -> &'static str {
    match signal {
        Signal::Stop => "SIGSTOP",
        Signal::Continue => "SIGCONT",
        Signal::Kill => "SIGKILL",
        Signal::Term => "SIGTERM",
        _ => "signal",
    }
}

/// Delivers a signal to a local process.
pub trait SignalSender {
    fn send(&self, pid: u32, signal: Signal) -> Result<(), ActionError>;
}

/// Local delivery through sysinfo.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSignals;

impl SignalSender for LocalSignals {
    fn send(&self, pid: u32, signal: Signal) -> Result<(), ActionError> {
        let sysinfo_pid = Pid::from_u32(pid);
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sysinfo_pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        let signal_name = signal_name(signal);
        let pid_i32 = pid as i32;
        match sys.process(sysinfo_pid) {
            Some(process) => match process.kill_with(signal) {
                Some(true) => {
                    info!(pid, signal = signal_name, "signal delivered");
                    Ok(())
                }
                Some(false) => Err(ActionError::SignalFailed {
                    pid: pid_i32,
                    signal: signal_name,
                }),
                None => Err(ActionError::Unsupported {
                    signal: signal_name,
                }),
            },
            None => Err(ActionError::NotFound(pid_i32)),
        }
    }
}
