//! Router configuration file models.

mod data_source;
mod router;

pub use data_source::{DataSourceProps, PoolProps};
pub use router::{RouterConfig, DEFAULT_DATA_SOURCE_PREFIX};
