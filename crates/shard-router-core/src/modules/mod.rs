//! Configuration file handling and logging setup.

pub mod config;
pub mod logger;
