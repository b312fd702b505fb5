//! Terminal helpers: styling, spinners and logging setup

pub mod logging;
pub mod progress;
pub mod styling;

pub use logging::{init_logging, LogConfig};
pub use progress::*;
pub use styling::*;
