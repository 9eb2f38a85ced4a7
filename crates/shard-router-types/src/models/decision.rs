//! Result of routing one key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shard a routing key maps to.
///
/// `db_index` is 1-based (`1..=db_count`), `tb_index` is 0-based
/// (`0..tb_count`). Derived only from the key value and the shard config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RoutingDecision {
    pub db_index: u32,
    pub tb_index: u32,
}

impl RoutingDecision {
    pub const fn new(db_index: u32, tb_index: u32) -> Self {
        Self { db_index, tb_index }
    }

    /// Database index as a 2-digit zero-padded string (`"01"`).
    pub fn db_key(&self) -> String {
        format_db_key(self.db_index)
    }

    /// Table index as a 3-digit zero-padded string (`"003"`).
    pub fn tb_key(&self) -> String {
        format_tb_key(self.tb_index)
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "db {:02} / tb {:03}", self.db_index, self.tb_index)
    }
}

/// Render a database index the way physical identifiers expect it.
pub fn format_db_key(db_index: u32) -> String {
    format!("{db_index:02}")
}

/// Render a table index the way shard suffixes expect it.
pub fn format_tb_key(tb_index: u32) -> String {
    format!("{tb_index:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_keys() {
        let decision = RoutingDecision::new(2, 1);
        assert_eq!(decision.db_key(), "02");
        assert_eq!(decision.tb_key(), "001");
        assert_eq!(decision.to_string(), "db 02 / tb 001");
    }

    #[test]
    fn test_wide_indices_are_not_truncated() {
        let decision = RoutingDecision::new(123, 4567);
        assert_eq!(decision.db_key(), "123");
        assert_eq!(decision.tb_key(), "4567");
    }
}
