pub mod config;
pub mod control;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use run::{run_daemon, DaemonOptions};
pub use wiring::{resolve_paths, wire_dependencies, ResolvedPaths, Wiring, WiringError};
