pub mod cpu;
pub mod enumerator;
pub mod platform;
pub mod process;
pub mod procfs;
pub mod signal;
pub mod snapshot;
