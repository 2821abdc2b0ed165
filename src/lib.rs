pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod prompt;
pub mod telemetry;
pub mod ui;

pub use error::{Error, Result};
