pub mod agent;
pub mod config;
pub mod registry;

pub use agent::HostAgent;
pub use config::{ConnectionKind, Execution, HostConfig};
pub use registry::HostRegistry;
