//! Hash routing: map a routing key value to a (database, table) pair.

use shard_router_types::{RouterError, RoutingDecision, ShardConfig};
use std::fmt::Debug;

use super::context;

/// Decides which shard a routing key value belongs to.
pub trait RoutingStrategy: Send + Sync + Debug {
    /// Pure computation of the shard for `key_value`.
    fn decide(&self, key_value: &str) -> Result<RoutingDecision, RouterError>;

    fn db_count(&self) -> u32;

    fn tb_count(&self) -> u32;

    /// Decide and bind the result to the running operation's context.
    fn route(&self, key_value: &str) -> Result<RoutingDecision, RouterError> {
        let decision = self.decide(key_value)?;
        context::bind(decision)?;
        tracing::debug!(
            db_idx = %decision.db_key(),
            tb_idx = %decision.tb_key(),
            "db router decision bound"
        );
        Ok(decision)
    }

    /// Wipe the running operation's context.
    fn clear(&self) {
        context::clear();
    }
}

/// Java `String.hashCode`: `h = 31 * h + c` over UTF-16 code units with
/// wrapping 32-bit arithmetic. Returned as the raw bit pattern.
pub fn java_string_hash(value: &str) -> u32 {
    value
        .encode_utf16()
        .fold(0_u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Spread the high half of the hash into the low half.
pub const fn spread(hash: u32) -> u32 {
    hash ^ (hash >> 16)
}

/// Routes with `(size - 1) & spread(hash(key))`.
///
/// The mask only behaves like a uniform bucket selector when
/// `db_count * tb_count` is a power of two. Other sizes still route
/// deterministically but leave some slots unused; e.g. 3 x 5 = 15 masks with
/// `0b1110` and never produces an odd slot. Existing data is placed by this
/// exact formula, so it must not be replaced with a modulo.
#[derive(Debug, Clone)]
pub struct HashRoutingStrategy {
    config: ShardConfig,
}

impl HashRoutingStrategy {
    /// Fails with `InvalidShardConfig` when the layout is unusable.
    pub fn new(config: ShardConfig) -> Result<Self, RouterError> {
        config.check()?;
        if !config.slot_count().is_power_of_two() {
            tracing::warn!(
                db_count = config.db_count,
                tb_count = config.tb_count,
                "shard slot count is not a power of two, keys will not spread evenly"
            );
        }
        Ok(Self { config })
    }

    pub const fn config(&self) -> &ShardConfig {
        &self.config
    }

    /// Slot in `0..db_count * tb_count` for `key_value`.
    pub fn slot(&self, key_value: &str) -> u32 {
        let size = self.config.slot_count();
        (size - 1) & spread(java_string_hash(key_value))
    }
}

impl RoutingStrategy for HashRoutingStrategy {
    fn decide(&self, key_value: &str) -> Result<RoutingDecision, RouterError> {
        if key_value.trim().is_empty() {
            return Err(RouterError::RoutingKeyMissing);
        }

        let tb_count = self.config.tb_count;
        let slot = self.slot(key_value);
        let db_index = slot / tb_count + 1;
        let tb_index = slot - tb_count * (db_index - 1);
        Ok(RoutingDecision::new(db_index, tb_index))
    }

    fn db_count(&self) -> u32 {
        self.config.db_count
    }

    fn tb_count(&self) -> u32 {
        self.config.tb_count
    }
}
