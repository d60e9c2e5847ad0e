pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod remote;
pub mod system;
