//! Per-operation routing context.
//!
//! The context lives in a task-local slot that only exists inside
//! [`scope`] / [`sync_scope`]. Each scope starts empty and is dropped with
//! the operation, so a pooled worker thread or a reused task never sees a
//! decision bound by an earlier operation. Nested scopes shadow the outer
//! context and restore it on exit.

use shard_router_types::models::{format_db_key, format_tb_key};
use shard_router_types::{RouterError, RoutingDecision};
use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;

use super::strategy::RoutingStrategy;

tokio::task_local! {
    static ROUTING_CONTEXT: RefCell<RoutingContext>;
}

/// Shard indices bound to the running operation.
///
/// Empty until the strategy routes the operation, and empty again once it
/// is cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingContext {
    db_index: Option<u32>,
    tb_index: Option<u32>,
}

impl RoutingContext {
    pub const fn empty() -> Self {
        Self { db_index: None, tb_index: None }
    }

    /// 1-based database index, if routed.
    pub const fn db_index(&self) -> Option<u32> {
        self.db_index
    }

    /// 0-based table index, if routed.
    pub const fn tb_index(&self) -> Option<u32> {
        self.tb_index
    }

    pub fn db_key(&self) -> Option<String> {
        self.db_index.map(format_db_key)
    }

    pub fn tb_key(&self) -> Option<String> {
        self.tb_index.map(format_tb_key)
    }

    pub const fn is_routed(&self) -> bool {
        self.db_index.is_some() || self.tb_index.is_some()
    }

    fn bind(&mut self, decision: RoutingDecision) -> Result<(), RouterError> {
        if let (Some(db_index), Some(tb_index)) = (self.db_index, self.tb_index) {
            return Err(RouterError::AlreadyRouted { db_index, tb_index });
        }
        self.db_index = Some(decision.db_index);
        self.tb_index = Some(decision.tb_index);
        Ok(())
    }

    fn clear(&mut self) {
        *self = Self::empty();
    }
}

/// Run `fut` as one logical operation with a fresh, empty context.
pub async fn scope<F: Future>(fut: F) -> F::Output {
    ROUTING_CONTEXT.scope(RefCell::new(RoutingContext::empty()), fut).await
}

/// Blocking counterpart of [`scope`].
pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
    ROUTING_CONTEXT.sync_scope(RefCell::new(RoutingContext::empty()), f)
}

/// Snapshot of the context of the running operation. Outside a scope this is
/// always the empty context.
pub fn current() -> RoutingContext {
    ROUTING_CONTEXT.try_with(|cell| *cell.borrow()).unwrap_or_default()
}

/// Whether the caller runs inside an operation scope.
pub fn in_scope() -> bool {
    ROUTING_CONTEXT.try_with(|_| ()).is_ok()
}

/// Bind `decision` to the running operation.
pub(crate) fn bind(decision: RoutingDecision) -> Result<(), RouterError> {
    ROUTING_CONTEXT
        .try_with(|cell| cell.borrow_mut().bind(decision))
        .map_err(|_| RouterError::NoRoutingScope)?
}

/// Reset the running operation's context. No-op outside a scope.
pub fn clear() {
    let _ = ROUTING_CONTEXT.try_with(|cell| cell.borrow_mut().clear());
}

/// RAII guard that clears the routing context when dropped.
///
/// Created before routing starts so that a failure halfway through routing,
/// an error from the operation body, a panic, or cancellation of the
/// surrounding future all leave the context empty.
pub struct RoutingGuard {
    strategy: Option<Arc<dyn RoutingStrategy>>,
}

impl RoutingGuard {
    /// Guard that clears through `strategy`.
    pub fn new(strategy: Arc<dyn RoutingStrategy>) -> Self {
        Self { strategy: Some(strategy) }
    }

    /// Guard that clears the context directly.
    pub const fn detached() -> Self {
        Self { strategy: None }
    }
}

impl Drop for RoutingGuard {
    fn drop(&mut self) {
        match &self.strategy {
            Some(strategy) => strategy.clear(),
            None => clear(),
        }
    }
}
