use serde::Serialize;

/// Upper bound on a display name, in bytes.
pub const MAX_NAME_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: i32,
    pub ppid: i32,
    pub state: char,
    pub name: String,
    pub memory_kb: u64,
    pub cpu_percent: f32,
    pub elapsed_secs: f64,
    pub is_kernel: bool,
}

impl ProcessRecord {
    pub fn state_label(&self) -> &'static str {
        match self.state {
            'R' => "Running",
            'S' => "Sleeping",
            'D' => "Disk sleep",
            'Z' => "Zombie",
            'T' => "Stopped",
            't' => "Tracing stop",
            'X' | 'x' => "Dead",
            'I' => "Idle",
            'W' => "Paging",
            'K' => "Wakekill",
            'P' => "Parked",
            _ => "Unknown",
        }
    }
}

/// Truncates `raw` to at most [`MAX_NAME_LEN`] bytes on a char boundary.
pub fn bounded_name(raw: &str) -> String {
    if raw.len() <= MAX_NAME_LEN {
        return raw.to_string();
    }
    let mut end = MAX_NAME_LEN;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_string()
}
