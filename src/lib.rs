pub mod abort;
pub mod args;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod log;
pub mod prompt;
pub mod resolve;

pub use error::{Error, Result};
