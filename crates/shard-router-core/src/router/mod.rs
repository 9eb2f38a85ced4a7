//! Routing core: strategy, per-operation context, key extraction, join point,
//! statement rewrite and shard selection.

pub mod context;
pub mod extraction;
pub mod join_point;
pub mod rewriter;
pub mod selector;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use context::{RoutingContext, RoutingGuard};
pub use extraction::{RouteArg, RouteAttributes};
pub use join_point::{DbRoute, DbRouterJoinPoint};
pub use rewriter::StatementRewriter;
pub use selector::ShardSelector;
pub use strategy::{HashRoutingStrategy, RoutingStrategy};
