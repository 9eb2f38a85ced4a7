//! Scenario tests spanning strategy, context, selector and rewriter.


use super::context;
use super::strategy::{HashRoutingStrategy, RoutingStrategy};
use shard_router_types::{RouterError, RoutingDecision, ShardConfig};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hash strategy that counts how often the context was cleared.
#[derive(Debug)]
pub(super) struct CountingStrategy {
    inner: HashRoutingStrategy,
    clears: AtomicUsize,
}

impl CountingStrategy {
    pub(super) fn new(db_count: u32, tb_count: u32) -> Self {
        let config = ShardConfig::new(db_count, tb_count, "uId").unwrap();
        Self { inner: HashRoutingStrategy::new(config).unwrap(), clears: AtomicUsize::new(0) }
    }

    pub(super) fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl RoutingStrategy for CountingStrategy {
    fn decide(&self, key_value: &str) -> Result<RoutingDecision, RouterError> {
        self.inner.decide(key_value)
    }

    fn db_count(&self) -> u32 {
        self.inner.db_count()
    }

    fn tb_count(&self) -> u32 {
        self.inner.tb_count()
    }

    fn clear(&self) {
        let _previous = self.clears.fetch_add(1, Ordering::SeqCst);
        context::clear();
    }
}

/// Error type of a data-access layer that embeds routing errors.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum DaoError {
    Router(RouterError),
    Query(String),
}

impl From<RouterError> for DaoError {
    fn from(err: RouterError) -> Self {
        Self::Router(err)
    }
}
