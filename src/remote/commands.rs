use crate::system::signal::Verb;

/// CPU-sorted listing, columns pid, %cpu, %mem, command name.
pub const LIST_COMMAND: &str = "ps -eo pid,pcpu,pmem,comm --no-headers --sort=-pcpu | head -50";

/// For `ps` implementations without `-o`/`--sort`.
pub const FALLBACK_LIST_COMMAND: &str = "ps aux --no-headers | head -50";

/// Shell fragment that performs `verb` on `pid` and prints its own exit code.
pub fn action_command(verb: Verb, pid: i32) -> String {
    match verb {
        Verb::Pause => format!("kill -STOP {pid} 2>/dev/null; echo $?"),
        Verb::Resume => format!("kill -CONT {pid} 2>/dev/null; echo $?"),
        Verb::Kill => format!("kill -9 {pid} 2>/dev/null; echo $?"),
        Verb::Restart => {
            format!("kill -TERM {pid} 2>/dev/null; sleep 0.5; kill -CONT {pid} 2>/dev/null; echo $?")
        }
    }
}

/// The echoed exit code: the last output line that is a bare integer.
/// Telnet sessions surround it with prompts and echoes, hence the scan.
pub fn parse_exit_code(output: &str) -> Option<i32> {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find_map(|line| line.parse::<i32>().ok())
}
