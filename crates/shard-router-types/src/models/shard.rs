//! Immutable sharding parameters.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::RouterError;

/// Largest `db_count * tb_count` accepted. Slot math is defined over signed
/// 32-bit integers, so the product must stay representable there.
pub const MAX_SLOT_COUNT: u32 = i32::MAX.unsigned_abs();

/// Count fields in the order failures are reported.
const COUNT_FIELDS: [&str; 2] = ["db_count", "tb_count"];

/// Sharding layout: `db_count` physical databases, each holding `tb_count`
/// physical copies of every split table.
///
/// Counts are fixed for the lifetime of the process. Changing either one
/// moves almost every key to a different shard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ShardConfig {
    /// Number of physical databases
    #[validate(range(min = 1_u32))]
    pub db_count: u32,
    /// Number of tables per database
    #[validate(range(min = 1_u32))]
    pub tb_count: u32,
    /// Attribute name used when an operation does not override it
    #[serde(default)]
    pub router_key: String,
}

impl ShardConfig {
    /// Build and validate a config.
    pub fn new(
        db_count: u32,
        tb_count: u32,
        router_key: impl Into<String>,
    ) -> Result<Self, RouterError> {
        let config = Self { db_count, tb_count, router_key: router_key.into() };
        config.check()?;
        Ok(config)
    }

    /// Validate counts and the default routing key.
    pub fn check(&self) -> Result<(), RouterError> {
        if let Err(errors) = self.validate() {
            let failing = errors.field_errors();
            let field = COUNT_FIELDS
                .into_iter()
                .find(|field| failing.contains_key(*field))
                .unwrap_or("shard");
            return Err(RouterError::invalid(field, "must be at least 1"));
        }

        if self.db_count.checked_mul(self.tb_count).map_or(true, |size| size > MAX_SLOT_COUNT) {
            return Err(RouterError::invalid(
                "tb_count",
                format!(
                    "db_count * tb_count ({} * {}) exceeds {}",
                    self.db_count, self.tb_count, MAX_SLOT_COUNT
                ),
            ));
        }

        if self.router_key.trim().is_empty() {
            return Err(RouterError::invalid("router_key", "default routing key is blank"));
        }

        Ok(())
    }

    /// Total number of (database, table) slots.
    ///
    /// Only meaningful on a config that passed [`ShardConfig::check`].
    pub const fn slot_count(&self) -> u32 {
        self.db_count.saturating_mul(self.tb_count)
    }
}
