use std::time::Instant;

use super::process::ProcessRecord;

/// One complete poll of one host. Replaced wholesale on every successful poll.
#[derive(Debug)]
pub struct Snapshot {
    pub processes: Vec<ProcessRecord>,
    pub taken_at: Option<Instant>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Snapshot {
            processes: Vec::new(),
            taken_at: None,
        }
    }

    pub fn new(processes: Vec<ProcessRecord>) -> Self {
        Snapshot {
            processes,
            taken_at: Some(Instant::now()),
        }
    }

    pub fn find(&self, pid: i32) -> Option<&ProcessRecord> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    pub fn kernel_count(&self) -> usize {
        self.processes.iter().filter(|p| p.is_kernel).count()
    }

    pub fn total_cpu_percent(&self) -> f32 {
        self.processes.iter().map(|p| p.cpu_percent).sum()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
