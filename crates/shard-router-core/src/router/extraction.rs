//! Locate the routing key value among an operation's arguments.
//!
//! Argument types expose named attributes through [`RouteAttributes`]
//! instead of being inspected at runtime. Maps and JSON objects work out of
//! the box; record types implement the trait by hand.

use serde_json::Value;
use shard_router_types::RouterError;
use std::collections::{BTreeMap, HashMap};

/// Named attribute lookup on an operation argument.
pub trait RouteAttributes: Sync {
    /// String form of attribute `name`, or `None` if the argument has no
    /// such attribute.
    fn route_attribute(&self, name: &str) -> Option<String>;
}

impl RouteAttributes for HashMap<String, String> {
    fn route_attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl RouteAttributes for BTreeMap<String, String> {
    fn route_attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl RouteAttributes for Value {
    fn route_attribute(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// One argument of a routed operation.
#[derive(Clone, Copy)]
pub enum RouteArg<'a> {
    /// Plain string argument
    Value(&'a str),
    /// Structured argument with named attributes
    Record(&'a dyn RouteAttributes),
}

impl std::fmt::Debug for RouteArg<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Record(_) => f.write_str("Record(..)"),
        }
    }
}

impl<'a> From<&'a str> for RouteArg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Value(value)
    }
}

impl<'a, T: RouteAttributes> From<&'a T> for RouteArg<'a> {
    fn from(record: &'a T) -> Self {
        Self::Record(record)
    }
}

/// Effective routing key name: the operation override, else the configured
/// default.
pub fn resolve_router_key<'a>(
    operation_key: Option<&'a str>,
    default_key: &'a str,
) -> Result<&'a str, RouterError> {
    match operation_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => Ok(key),
        None if !default_key.trim().is_empty() => Ok(default_key.trim()),
        None => Err(RouterError::RoutingKeyMissing),
    }
}

/// Value of attribute `attr` among `args`.
///
/// A single plain string argument is the value itself. Otherwise every
/// argument is tried in order and the first non-blank attribute value wins.
pub fn resolve_attr_value(attr: &str, args: &[RouteArg<'_>]) -> Result<String, RouterError> {
    if let [RouteArg::Value(value)] = args {
        return Ok((*value).to_string());
    }

    for (position, arg) in args.iter().enumerate() {
        let found = match arg {
            RouteArg::Record(record) => record.route_attribute(attr),
            RouteArg::Value(_) => None,
        };
        match found {
            Some(value) if !value.trim().is_empty() => return Ok(value),
            Some(_) => tracing::debug!(attr, position, "routing attribute is blank, trying next"),
            None => tracing::debug!(attr, position, "argument has no routing attribute"),
        }
    }

    tracing::error!(attr, args = args.len(), "failed to resolve routing attribute value");
    Err(RouterError::AttributeNotFound { attr: attr.to_string() })
}
