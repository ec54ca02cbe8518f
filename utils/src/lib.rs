//! Shared utilities: logging setup and small formatting helpers.

pub mod logging;
pub mod time;

pub use logging::init_tracing;
pub use time::format_duration;
