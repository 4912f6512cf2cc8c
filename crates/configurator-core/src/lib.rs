//! Settings persistence and server config discovery for the ONVIF server
//! emulator configurator

pub mod catalog;
pub mod config;
pub mod error;
pub mod prompt;

// Re-export main types for convenience
pub use catalog::*;
pub use config::*;
pub use error::*;
pub use prompt::*;
