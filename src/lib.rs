// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod history;
pub mod progress;
pub mod rest;
pub mod runtime;
pub mod session;
pub mod snapshot;
pub mod util;
pub mod workout;
