#![cfg(unix)]

use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use hostop::error::ActionError;
use hostop::host::{HostAgent, HostConfig};
use hostop::system::signal::Verb;
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

fn spawn_long_lived_child() -> Child {
    Command::new("sleep")
        .arg("30")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn child process")
}

fn status_of(sys: &mut System, pid: u32) -> Option<ProcessStatus> {
    let sys_pid = Pid::from_u32(pid);
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[sys_pid]),
        true,
        ProcessRefreshKind::everything(),
    );
    sys.process(sys_pid).map(|p| p.status())
}

fn wait_for_status(pid: u32, wanted: ProcessStatus, timeout: Duration) -> bool {
    let mut sys = System::new();
    let deadline = Instant::now() + timeout;
    loop {
        if status_of(&mut sys, pid) == Some(wanted) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn wait_for_exit(child: &mut Child, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(50)),
            Ok(None) => {
                let _ = child.kill();
                panic!("child process did not exit before timeout");
            }
            Err(err) => {
                let _ = child.kill();
                panic!("failed waiting for child exit: {err}");
            }
        }
    }
}

#[test]
fn act_on_missing_pid_returns_not_found() {
    let agent = HostAgent::default();
    let result = agent.act(&HostConfig::local(), i32::MAX, Verb::Resume);
    assert!(matches!(result, Err(ActionError::NotFound(_))));
}

#[test]
fn pause_resume_kill_spawned_child() {
    let mut child = spawn_long_lived_child();
    let pid = child.id();
    let agent = HostAgent::default();
    let local = HostConfig::local();

    if let Err(err) = agent.act(&local, pid as i32, Verb::Pause) {
        let _ = child.kill();
        panic!("pause failed: {err}");
    }
    if !wait_for_status(pid, ProcessStatus::Stop, Duration::from_secs(3)) {
        let _ = child.kill();
        panic!("child PID {pid} never showed as stopped");
    }

    if let Err(err) = agent.act(&local, pid as i32, Verb::Resume) {
        let _ = child.kill();
        panic!("resume failed: {err}");
    }
    if !wait_for_status(pid, ProcessStatus::Sleep, Duration::from_secs(3)) {
        let _ = child.kill();
        panic!("child PID {pid} never resumed");
    }

    if let Err(err) = agent.act(&local, pid as i32, Verb::Kill) {
        let _ = child.kill();
        panic!("kill failed: {err}");
    }
    wait_for_exit(&mut child, Duration::from_secs(5));
}
