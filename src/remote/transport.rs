use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::TransportError;
use crate::host::config::{Execution, HostConfig};
use crate::system::platform;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Captured stdout beyond this many bytes is drained and dropped.
pub const MAX_OUTPUT_BYTES: u64 = 64 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Lines of expect chatter (`spawn telnet ...`, `Trying ...`) ahead of the
/// session output.
const TELNET_BANNER_LINES: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub status: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs a shell command on a remote host and captures its output.
pub trait RemoteTransport {
    fn execute(
        &self,
        host: &HostConfig,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError>;
}

/// Drives the system `ssh`/`sshpass` and `expect`+`telnet` clients.
#[derive(Clone, Debug)]
pub struct ShellTransport {
    connect_timeout: Duration,
    /// Where client binaries are looked up; `$PATH` when unset.
    search_path: Option<OsString>,
    /// Where telnet session scripts are written; the system temp dir when unset.
    script_dir: Option<PathBuf>,
}

impl Default for ShellTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl ShellTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        ShellTransport {
            connect_timeout,
            search_path: None,
            script_dir: None,
        }
    }

    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = Some(dir.into());
        self
    }

    fn find_tool(&self, tool: &'static str) -> Result<PathBuf, TransportError> {
        let path = match &self.search_path {
            Some(path) => Some(path.clone()),
            None => env::var_os("PATH"),
        };
        path.and_then(|path| find_in_path(tool, &path))
            .ok_or(TransportError::MissingTool { tool })
    }

    fn ssh(
        &self,
        host: &HostConfig,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        let ssh = self.find_tool("ssh")?;

        let mut cmd = if host.password.is_empty() {
            let mut cmd = Command::new(ssh);
            // no password relay: never fall back to an interactive prompt
            cmd.args(["-o", "BatchMode=yes"]);
            cmd
        } else {
            let sshpass = self.find_tool("sshpass")?;
            let mut cmd = Command::new(sshpass);
            cmd.arg("-e").env("SSHPASS", &host.password).arg(ssh);
            cmd
        };
        cmd.args(["-o", "StrictHostKeyChecking=no"])
            .arg("-o")
            .arg(format!(
                "ConnectTimeout={}",
                self.connect_timeout.as_secs().max(1)
            ))
            .arg("-p")
            .arg(host.port.to_string())
            .arg(host.login_target())
            .arg(command);

        run_with_timeout(cmd, "ssh", timeout)
    }

    fn telnet(
        &self,
        host: &HostConfig,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        let expect = self.find_tool("expect")?;

        // Removed when `script` drops, on every path out of this function.
        let mut builder = tempfile::Builder::new();
        builder.prefix("hostop-telnet-").suffix(".exp");
        let mut script = match &self.script_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(TransportError::Script)?;
        script
            .write_all(render_expect_script(host, command, timeout).as_bytes())
            .and_then(|()| script.flush())
            .map_err(TransportError::Script)?;

        let mut cmd = Command::new(expect);
        cmd.arg("-f").arg(script.path());
        // expect enforces its own timeout; the outer bound adds slack for spawn
        let mut output = run_with_timeout(cmd, "expect", timeout + Duration::from_secs(1))?;
        output.stdout = strip_banner(&output.stdout, TELNET_BANNER_LINES);
        Ok(output)
    }
}

impl RemoteTransport for ShellTransport {
    fn execute(
        &self,
        host: &HostConfig,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        let _span = tracing::debug_span!("transport.execute", host = %host.name).entered();
        let result = match host.execution() {
            Execution::Local => return Err(TransportError::NotRemote(host.name.clone())),
            Execution::SecureShell => self.ssh(host, command, timeout),
            Execution::Telnet => self.telnet(host, command, timeout),
        };
        match &result {
            Ok(output) => debug!(status = output.status, bytes = output.stdout.len(), "remote command finished"),
            Err(err) => warn!(error = %err, "remote command failed"),
        }
        result
    }
}

/// The expect(1) script for one telnet session.
pub fn render_expect_script(host: &HostConfig, command: &str, timeout: Duration) -> String {
    let mut script = String::new();
    let _ = writeln!(script, "set timeout {}", timeout.as_secs().max(1));
    let _ = writeln!(
        script,
        "spawn telnet {} {}",
        tcl_quote(&host.address),
        host.port
    );
    let _ = writeln!(script, "expect {{");
    let _ = writeln!(script, "  \"login:\" {{ send {}\\r\" }}", tcl_quote_open(&host.username));
    let _ = writeln!(script, "  timeout {{ exit 1 }}");
    let _ = writeln!(script, "}}");
    let _ = writeln!(script, "expect {{");
    let _ = writeln!(script, "  \"Password:\" {{ send {}\\r\" }}", tcl_quote_open(&host.password));
    let _ = writeln!(script, "  timeout {{ exit 1 }}");
    let _ = writeln!(script, "}}");
    let _ = writeln!(script, "expect {{");
    let _ = writeln!(script, "  \">\" {{");
    let _ = writeln!(script, "    send {}\\r\"", tcl_quote_open(command));
    let _ = writeln!(script, "    expect \">\"");
    let _ = writeln!(script, "    send \"exit\\r\"");
    let _ = writeln!(script, "    expect eof");
    let _ = writeln!(script, "  }}");
    let _ = writeln!(script, "  timeout {{ exit 1 }}");
    let _ = writeln!(script, "}}");
    script
}

/// A complete Tcl double-quoted word.
fn tcl_quote(value: &str) -> String {
    format!("{}\"", tcl_quote_open(value))
}

/// A Tcl double-quoted word left open so the caller can append `\r"`.
fn tcl_quote_open(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 1);
    out.push('"');
    for ch in value.chars() {
        if matches!(ch, '\\' | '"' | '$' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn strip_banner(output: &str, lines: usize) -> String {
    output.split_inclusive('\n').skip(lines).collect()
}

fn find_in_path(tool: &str, paths: &OsStr) -> Option<PathBuf> {
    env::split_paths(paths)
        .map(|dir| dir.join(tool))
        .find(|candidate| candidate.is_file())
}

/// Runs `cmd` to completion, bounded by `timeout` from spawn until its
/// stdout closes.
fn run_with_timeout(
    mut cmd: Command,
    program: &'static str,
    timeout: Duration,
) -> Result<CommandOutput, TransportError> {
    platform::isolate_process_group(&mut cmd);
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| TransportError::Spawn { program, source })?;
    let deadline = Instant::now() + timeout;

    let (tx, rx) = mpsc::channel();
    let stdout = child.stdout.take();
    thread::spawn(move || {
        // receiver gone means the caller already timed out
        let _ = tx.send(read_capped(stdout));
    });

    let Some(status) = wait_until(&mut child, deadline)? else {
        return Err(TransportError::Timeout(timeout));
    };

    // a surviving grandchild (ControlMaster, orphaned ssh) can hold the pipe open
    let remaining = deadline.saturating_duration_since(Instant::now());
    let bytes = match rx.recv_timeout(remaining) {
        Ok(read) => read?,
        Err(RecvTimeoutError::Timeout) => {
            warn!(program, "output still open after exit; killing process group");
            platform::kill_process_group(child.id());
            return Err(TransportError::Timeout(timeout));
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(io::Error::other("output reader panicked").into());
        }
    };
    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&bytes).into_owned(),
        // killed by a signal: no code
        status: status.code().unwrap_or(-1),
    })
}

fn read_capped(stdout: Option<ChildStdout>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stdout) = stdout {
        (&mut stdout).take(MAX_OUTPUT_BYTES).read_to_end(&mut buf)?;
        io::copy(&mut stdout, &mut io::sink())?;
    }
    Ok(buf)
}

/// Waits for `child` until `deadline`; on expiry kills its group and returns `None`.
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            platform::kill_process_group(child.id());
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
