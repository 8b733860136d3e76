//! Headless mode for automated runs
//!
//! Runs the arena without graphics: a JSON config describes the run, an
//! autopilot plays the wizard, and the result comes back as a `RunResult`
//! (optionally with the combat log written to disk).

pub mod autopilot;
pub mod config;
pub mod runner;

pub use config::{HeadlessRunConfig, PlayerConfig};
pub use runner::{build_headless_app, run_headless, HeadlessRunState, RunResult};
