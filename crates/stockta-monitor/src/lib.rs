//! Observability for the analysis pipeline: subscriber setup and log formats.

mod logging;

pub use logging::{filter_directives, setup_logging, LogFormat};
