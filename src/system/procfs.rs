use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT: &str = "/proc";

/// Fields of interest from `/proc/<pid>/status`. Every field is optional
/// because kernel threads and zombies omit some of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusFields {
    pub name: Option<String>,
    pub state: Option<char>,
    pub ppid: Option<i32>,
    pub vm_rss_kb: Option<u64>,
    pub kthread: Option<bool>,
}

/// Fields of interest from `/proc/<pid>/stat`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatFields {
    pub utime: u64,
    pub stime: u64,
    pub start_ticks: u64,
}

impl StatFields {
    pub fn cpu_ticks(&self) -> u64 {
        self.utime + self.stime
    }
}

/// Read access to a procfs tree. The root is configurable so the reader can be
/// pointed at a synthetic tree.
#[derive(Clone, Debug)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcFs {
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        ProcFs { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Numeric entries of the process table, in directory order.
    pub fn pids(&self) -> io::Result<Vec<i32>> {
        let mut pids = Vec::new();
        for entry in fs::read_dir(&self.root)?.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if let Ok(pid) = name.parse::<i32>() {
                pids.push(pid);
            }
        }
        Ok(pids)
    }

    pub fn status(&self, pid: i32) -> Option<StatusFields> {
        let contents = fs::read_to_string(self.entry(pid).join("status")).ok()?;
        Some(parse_status(&contents))
    }

    pub fn comm(&self, pid: i32) -> Option<String> {
        let contents = fs::read_to_string(self.entry(pid).join("comm")).ok()?;
        let name = contents.trim_end_matches('\n');
        (!name.is_empty()).then(|| name.to_string())
    }

    pub fn stat(&self, pid: i32) -> Option<StatFields> {
        let contents = fs::read_to_string(self.entry(pid).join("stat")).ok()?;
        parse_stat(&contents)
    }

    /// Whether `/proc/<pid>/exe` resolves. Kernel threads have no image.
    pub fn has_exe(&self, pid: i32) -> bool {
        fs::read_link(self.entry(pid).join("exe")).is_ok()
    }

    pub fn uptime_secs(&self) -> Option<f64> {
        let contents = fs::read_to_string(self.root.join("uptime")).ok()?;
        parse_uptime(&contents)
    }

    pub fn total_cpu_ticks(&self) -> Option<u64> {
        let contents = fs::read_to_string(self.root.join("stat")).ok()?;
        parse_cpu_total(&contents)
    }

    fn entry(&self, pid: i32) -> PathBuf {
        self.root.join(pid.to_string())
    }
}

pub fn parse_status(contents: &str) -> StatusFields {
    let mut fields = StatusFields::default();
    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "Name" => fields.name = Some(value.to_string()),
            "State" => fields.state = value.chars().next(),
            "PPid" => fields.ppid = value.parse().ok(),
            // "VmRSS:	    1234 kB"
            "VmRSS" => {
                fields.vm_rss_kb = value.split_whitespace().next().and_then(|v| v.parse().ok());
            }
            "Kthread" => fields.kthread = value.parse::<u8>().ok().map(|v| v != 0),
            _ => {}
        }
    }
    fields
}

pub fn parse_stat(contents: &str) -> Option<StatFields> {
    // comm may contain spaces and parens, so split after the last ')'
    let after_comm = contents.rfind(')')? + 1;
    let fields: Vec<&str> = contents[after_comm..].split_whitespace().collect();
    // Fields after comm: state(0) ppid(1) pgrp(2) session(3) tty_nr(4)
    // tpgid(5) flags(6) minflt(7) cminflt(8) majflt(9) cmajflt(10)
    // utime(11) stime(12) cutime(13) cstime(14) priority(15) nice(16)
    // num_threads(17) itrealvalue(18) starttime(19)
    Some(StatFields {
        utime: fields.get(11)?.parse().ok()?,
        stime: fields.get(12)?.parse().ok()?,
        start_ticks: fields.get(19)?.parse().ok()?,
    })
}

/// Sum of user, nice, system, idle, iowait, irq and softirq from the
/// aggregate `cpu` line of `/proc/stat`.
pub fn parse_cpu_total(contents: &str) -> Option<u64> {
    let line = contents
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))?;
    let counters: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(7)
        .map(|v| v.parse().ok())
        .collect::<Option<_>>()?;
    (counters.len() == 7).then(|| counters.iter().sum())
}

pub fn parse_uptime(contents: &str) -> Option<f64> {
    contents.split_whitespace().next()?.parse().ok()
}
