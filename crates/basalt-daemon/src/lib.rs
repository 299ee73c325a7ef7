//! Headless Basalt daemon.
//!
//! Everything here is assembly: read the config, start tracing, build the
//! adapters, and hand events to the lifecycle scheduler until shutdown.

pub mod bootstrap;
