//! # Shard Router Core
//!
//! Routes data-access operations to a physical database and table.
//!
//! ## Architecture
//!
//! ```text
//! shard-router-core/src/
//! ├── router/
//! │   ├── strategy.rs    # key -> (db_index, tb_index), hash + mask
//! │   ├── context.rs     # per-operation task-local routing context
//! │   ├── extraction.rs  # locate the routing key value among arguments
//! │   ├── join_point.rs  # route -> proceed -> clear decorator
//! │   ├── rewriter.rs    # logical table -> table_NNN
//! │   └── selector.rs    # routing context -> physical data source id
//! ├── datasource.rs      # lazily created sqlx pools per data source
//! └── modules/
//!     ├── config.rs      # JSON config loading with env overrides
//!     └── logger.rs      # tracing subscriber setup
//! ```
//!
//! One operation moves through `Unrouted -> Routed -> Cleared`. The join
//! point opens a fresh context scope for every operation, so nothing bound
//! by one operation is visible to the next one running on the same task or
//! thread.

#![cfg_attr(test, allow(clippy::panic, clippy::print_stdout, clippy::unwrap_used))]

pub mod datasource;
pub mod error;
pub mod modules;
pub mod router;

// Re-export commonly used types
pub use datasource::DataSourceRegistry;
pub use error::{AppError, AppResult};
pub use router::{
    context, DbRoute, DbRouterJoinPoint, HashRoutingStrategy, RouteArg, RouteAttributes,
    RoutingContext, RoutingGuard, RoutingStrategy, ShardSelector, StatementRewriter,
};
pub use shard_router_types::{RouterConfig, RouterError, RoutingDecision, ShardConfig};
