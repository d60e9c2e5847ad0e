use std::os::unix::process::CommandExt;
use std::process::Command;

use super::{FALLBACK_CLOCK_TICKS, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn clock_ticks_per_second() -> u64 {
        // SAFETY: sysconf has no preconditions and only reads a constant.
        let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if ticks > 0 {
            ticks as u64
        } else {
            FALLBACK_CLOCK_TICKS
        }
    }

    fn isolate_process_group(cmd: &mut Command) {
        cmd.process_group(0);
    }

    fn kill_process_group(leader: u32) {
        let Ok(pgid) = libc::pid_t::try_from(leader) else {
            return;
        };
        if pgid <= 1 {
            return;
        }
        // SAFETY: kill takes plain integers; a negative pid addresses the group.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
}
