//! Explicit route -> proceed -> clear wrapper around a data-access call.

use shard_router_types::{RouterError, RoutingDecision};
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::context::{self, RoutingGuard};
use super::extraction::{resolve_attr_value, resolve_router_key, RouteArg};
use super::strategy::{HashRoutingStrategy, RoutingStrategy};

/// Routing declaration of one data-access operation.
///
/// `key` overrides the configured default routing key for this operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbRoute {
    key: Option<String>,
}

impl DbRoute {
    /// Route by the configured default key.
    pub const fn new() -> Self {
        Self { key: None }
    }

    /// Route by attribute `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: Some(key.into()) }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

/// Wraps routed operations.
///
/// Every call extracts the key value, opens a fresh routing scope, binds the
/// decision, runs the operation and clears the context on every exit path.
/// An operation nested inside another routed operation gets its own scope
/// and never sees the outer decision.
#[derive(Debug, Clone)]
pub struct DbRouterJoinPoint {
    default_key: String,
    strategy: Arc<dyn RoutingStrategy>,
}

impl DbRouterJoinPoint {
    pub fn new(default_key: impl Into<String>, strategy: Arc<dyn RoutingStrategy>) -> Self {
        Self { default_key: default_key.into(), strategy }
    }

    /// Join point using the strategy's configured default key.
    pub fn from_hash_strategy(strategy: HashRoutingStrategy) -> Self {
        let default_key = strategy.config().router_key.clone();
        Self::new(default_key, Arc::new(strategy))
    }

    pub fn strategy(&self) -> &Arc<dyn RoutingStrategy> {
        &self.strategy
    }

    /// Routing key value of an operation, before anything is bound.
    pub fn resolve_key_value(
        &self,
        route: &DbRoute,
        args: &[RouteArg<'_>],
    ) -> Result<String, RouterError> {
        let attr = resolve_router_key(route.key(), &self.default_key)?;
        resolve_attr_value(attr, args)
    }

    /// Run `op` routed by the key found in `args`.
    ///
    /// Dropping the returned future before completion still clears the
    /// context.
    pub async fn around<T, E, F, Fut>(
        &self,
        route: &DbRoute,
        args: &[RouteArg<'_>],
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce(RoutingDecision) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<RouterError>,
    {
        let key_value = self.resolve_key_value(route, args)?;
        let span = tracing::debug_span!("db_router", op = %Uuid::new_v4());

        context::scope(async move {
            let _guard = RoutingGuard::new(Arc::clone(&self.strategy));
            let decision = self.strategy.route(&key_value).map_err(E::from)?;
            op(decision).await
        })
        .instrument(span)
        .await
    }

    /// Blocking counterpart of [`DbRouterJoinPoint::around`].
    pub fn around_blocking<T, E, F>(
        &self,
        route: &DbRoute,
        args: &[RouteArg<'_>],
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce(RoutingDecision) -> Result<T, E>,
        E: From<RouterError>,
    {
        let key_value = self.resolve_key_value(route, args)?;
        let span = tracing::debug_span!("db_router", op = %Uuid::new_v4());
        let _entered = span.enter();

        context::sync_scope(|| {
            let _guard = RoutingGuard::new(Arc::clone(&self.strategy));
            let decision = self.strategy.route(&key_value).map_err(E::from)?;
            op(decision)
        })
    }
}
