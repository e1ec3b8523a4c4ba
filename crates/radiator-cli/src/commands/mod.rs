//! Command implementations for the CLI.

mod config;
mod control;

pub use config::cmd_config;
pub use control::{Target, cmd_get, cmd_set};
