//! # Shard Router Types
//!
//! Core types, configuration models, and error definitions for Shard Router.
//!
//! This crate provides the foundational type system for the router:
//!
//! - **`error`** - Typed error hierarchy for routing and configuration
//! - **`models`** - Domain models (ShardConfig, RoutingDecision, RouterConfig)
//!
//! ## Architecture Role
//!
//! `shard-router-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          shard-router-types (this crate)
//!                   │
//!                   ▼
//!          shard-router-core
//!                   │
//!                   ▼
//!          shard-router-cli
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde for config files and diagnostics
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{ConfigError, Result, RouterError, TypedError};

// Re-export core model types
pub use models::{DataSourceProps, PoolProps, RouterConfig, RoutingDecision, ShardConfig};
