// Library root — exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod alerts;
pub mod api;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod scheduler;
pub mod services;
pub mod sources;

// Startup wiring used by the binary.
pub mod cli;
pub mod config;
pub mod logging;
