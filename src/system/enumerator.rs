use std::time::Instant;

use tracing::{debug, trace, warn};

use super::cpu::CpuAccountant;
use super::platform;
use super::process::{ProcessRecord, bounded_name};
use super::procfs::ProcFs;
use crate::error::EnumerationError;

/// Starting capacity of a snapshot; the vector doubles past it.
pub const INITIAL_CAPACITY: usize = 256;

/// Builds the local process snapshot from procfs, one poll at a time.
pub struct ProcessEnumerator {
    procfs: ProcFs,
    accountant: CpuAccountant,
    clock_ticks: u64,
}

impl Default for ProcessEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessEnumerator {
    pub fn new() -> Self {
        Self::with_procfs(
            ProcFs::new(),
            platform::clock_ticks_per_second(),
            platform::logical_cores(),
        )
    }

    pub fn with_procfs(procfs: ProcFs, clock_ticks: u64, logical_cores: usize) -> Self {
        ProcessEnumerator {
            procfs,
            accountant: CpuAccountant::new(logical_cores),
            clock_ticks: clock_ticks.max(1),
        }
    }

    pub fn accountant(&self) -> &CpuAccountant {
        &self.accountant
    }

    pub fn list_local(&mut self) -> Result<Vec<ProcessRecord>, EnumerationError> {
        let _span = tracing::debug_span!("enumerator.list_local").entered();

        let pids = self.procfs.pids().map_err(|source| EnumerationError {
            path: self.procfs.root().to_path_buf(),
            source,
        })?;

        let now = Instant::now();
        let total_ticks = self.procfs.total_cpu_ticks().unwrap_or_else(|| {
            warn!("system cpu counters unreadable; cpu percentages will read 0");
            0
        });
        let uptime = self.procfs.uptime_secs().unwrap_or(0.0);

        self.accountant.begin_poll(total_ticks, now);
        let mut records = Vec::with_capacity(INITIAL_CAPACITY);
        for pid in pids {
            let Some((mut record, ticks)) = self.read_entry(pid, uptime) else {
                trace!(pid, "process entry unreadable, skipped");
                continue;
            };
            if let Some(ticks) = ticks {
                record.cpu_percent = self.accountant.observe(pid, ticks, now);
            }
            records.push(record);
        }
        self.accountant.finish_poll();

        debug!(
            count = records.len(),
            tracked = self.accountant.tracked(),
            "local enumeration complete"
        );
        Ok(records)
    }

    /// Reads a single process without touching the CPU history.
    pub fn process(&self, pid: i32) -> Option<ProcessRecord> {
        let uptime = self.procfs.uptime_secs().unwrap_or(0.0);
        self.read_entry(pid, uptime).map(|(record, _)| record)
    }

    fn read_entry(&self, pid: i32, uptime: f64) -> Option<(ProcessRecord, Option<u64>)> {
        let status = self.procfs.status(pid)?;
        let name = status
            .name
            .filter(|n| !n.is_empty())
            .or_else(|| self.procfs.comm(pid))
            .unwrap_or_default();
        let is_kernel = status.kthread.unwrap_or_else(|| !self.procfs.has_exe(pid));
        let stat = self.procfs.stat(pid);

        let elapsed_secs = stat
            .map(|s| (uptime - s.start_ticks as f64 / self.clock_ticks as f64).max(0.0))
            .unwrap_or(0.0);

        let record = ProcessRecord {
            pid,
            ppid: status.ppid.unwrap_or(0),
            state: status.state.unwrap_or('?'),
            name: bounded_name(&name),
            memory_kb: status.vm_rss_kb.unwrap_or(0),
            cpu_percent: 0.0,
            elapsed_secs,
            is_kernel,
        };
        Some((record, stat.map(|s| s.cpu_ticks())))
    }
}
