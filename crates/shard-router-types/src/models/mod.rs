//! Core domain models for Shard Router.
//!
//! This module contains the shared data structures used by the router core
//! and the command line tool.

mod config;
mod decision;
mod shard;

// Re-export all models
pub use config::{DataSourceProps, PoolProps, RouterConfig, DEFAULT_DATA_SOURCE_PREFIX};
pub use decision::{format_db_key, format_tb_key, RoutingDecision};
pub use shard::{ShardConfig, MAX_SLOT_COUNT};
