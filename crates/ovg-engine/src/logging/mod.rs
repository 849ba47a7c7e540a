//! Logging utilities.
//!
//! The engine only talks to the `log` facade; this module offers an
//! `env_logger` setup for hosts and tests that do not bring their own.

mod init;

pub use init::{init_logging, LoggingConfig};
