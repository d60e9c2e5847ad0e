//! Best-effort scraping of remote `ps` output.
//!
//! The remote side is not guaranteed to run a particular `ps` version or
//! locale, so every non-empty line yields a record: structured formats are
//! tried in order and the last resort keeps only the first word as a name.

use tracing::debug;

use crate::system::process::{ProcessRecord, bounded_name};

/// Lines beyond this are ignored.
pub const MAX_LINES: usize = 100;

/// Remote listings report memory as a percentage of total RAM; multiplying by
/// this gives a rough kilobyte figure, not an exact reading.
pub const MEMORY_PERCENT_TO_KB: f32 = 1024.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineFormat {
    /// `pid %cpu %mem name`
    PidCpuMemName,
    /// Eleven columns of a verbose listing.
    Verbose,
    /// Nothing matched; name only.
    NameOnly,
}

pub fn parse(raw: &str) -> Vec<ProcessRecord> {
    let mut records = Vec::new();
    let lines = raw
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .take(MAX_LINES);

    for (index, line) in lines.enumerate() {
        if let Some((record, format)) = parse_line(line, index + 1) {
            if format == LineFormat::NameOnly {
                debug!(line = index + 1, "listing line matched no known format");
            }
            records.push(record);
        }
    }
    records
}

/// Tries each format in order. `line_number` is 1-based and becomes the pid
/// of a name-only record. `None` only for blank lines.
pub fn parse_line(line: &str, line_number: usize) -> Option<(ProcessRecord, LineFormat)> {
    if let Some(record) = parse_pid_cpu_mem_name(line) {
        return Some((record, LineFormat::PidCpuMemName));
    }
    if let Some(record) = parse_verbose(line) {
        return Some((record, LineFormat::Verbose));
    }
    parse_name_only(line, line_number).map(|record| (record, LineFormat::NameOnly))
}

/// `1234 5.0 2.0 nginx`; trailing tokens are ignored.
pub fn parse_pid_cpu_mem_name(line: &str) -> Option<ProcessRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return None;
    }
    let pid = tokens[0].parse().ok()?;
    let cpu = parse_float(tokens[1])?;
    let mem = parse_float(tokens[2])?;
    Some(remote_record(pid, cpu, mem, tokens[3]))
}

/// Eleven columns: (ignored, pid, ignored, cpu, mem, five ignored, name).
/// The ignored third column must still be numeric.
pub fn parse_verbose(line: &str) -> Option<ProcessRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 11 {
        return None;
    }
    let pid = tokens[1].parse().ok()?;
    parse_float(tokens[2])?;
    let cpu = parse_float(tokens[3])?;
    let mem = parse_float(tokens[4])?;
    Some(remote_record(pid, cpu, mem, tokens[10]))
}

pub fn parse_name_only(line: &str, line_number: usize) -> Option<ProcessRecord> {
    let name = line.split_whitespace().next()?;
    let pid = i32::try_from(line_number).unwrap_or(i32::MAX);
    Some(remote_record(pid, 0.0, 0.0, name))
}

fn parse_float(token: &str) -> Option<f32> {
    token.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn remote_record(pid: i32, cpu: f32, mem_percent: f32, name: &str) -> ProcessRecord {
    ProcessRecord {
        pid,
        ppid: 1,
        state: 'R',
        name: bounded_name(name),
        memory_kb: (mem_percent * MEMORY_PERCENT_TO_KB) as u64,
        cpu_percent: cpu.clamp(0.0, 100.0),
        elapsed_secs: 0.0,
        is_kernel: false,
    }
}
