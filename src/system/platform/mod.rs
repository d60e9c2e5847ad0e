use std::process::Command;

use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Conventional USER_HZ, used when the running kernel cannot be asked.
pub const FALLBACK_CLOCK_TICKS: u64 = 100;

pub trait PlatformExtensions {
    fn clock_ticks_per_second() -> u64;

    /// Starts the command as the leader of a new process group.
    fn isolate_process_group(cmd: &mut Command);

    /// SIGKILLs every member of the group led by `leader`.
    fn kill_process_group(leader: u32);
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod fallback;

#[cfg(not(target_os = "linux"))]
use fallback as platform_impl;
#[cfg(target_os = "linux")]
use linux as platform_impl;

pub fn clock_ticks_per_second() -> u64 {
    platform_impl::Platform::clock_ticks_per_second()
}

pub fn isolate_process_group(cmd: &mut Command) {
    platform_impl::Platform::isolate_process_group(cmd);
}

pub fn kill_process_group(leader: u32) {
    platform_impl::Platform::kill_process_group(leader);
}

pub fn logical_cores() -> usize {
    let sys = System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    sys.cpus().len().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_values_are_positive() {
        assert!(clock_ticks_per_second() > 0);
        assert!(logical_cores() >= 1);
    }
}
