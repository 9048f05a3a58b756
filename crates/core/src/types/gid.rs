//! Shopify global IDs for orders.
//!
//! The admin extension hands us either the bare numeric id (`5512345678901`)
//! or the full GID (`gid://shopify/Order/5512345678901`). Both normalize to
//! [`OrderGid`], which renders back to the GID form for GraphQL and exposes
//! the numeric part for REST paths and file names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const GID_PREFIX: &str = "gid://shopify/";
const ORDER_RESOURCE: &str = "Order";

/// Errors raised while parsing an order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GidError {
    /// Nothing but whitespace was supplied.
    #[error("order id is empty")]
    Empty,

    /// The numeric part is missing, zero, or not a number.
    #[error("order id is not numeric: {0}")]
    NotNumeric(String),

    /// A well-formed GID that points at something other than an order.
    #[error("expected an Order GID, got {0}")]
    WrongResource(String),
}

/// A Shopify order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderGid(u64);

impl OrderGid {
    /// Create an order id from its numeric value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Parse a bare numeric id or a `gid://shopify/Order/{id}` string.
    ///
    /// Leading and trailing whitespace is ignored. Query strings on GIDs
    /// (`gid://shopify/Order/1?foo=bar`) are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GidError`] when the input is blank, not numeric, or a GID for
    /// another resource type.
    pub fn parse(input: &str) -> Result<Self, GidError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(GidError::Empty);
        }

        let numeric = match trimmed.strip_prefix(GID_PREFIX) {
            Some(rest) => {
                let (resource, id) = rest
                    .split_once('/')
                    .ok_or_else(|| GidError::NotNumeric(trimmed.to_string()))?;
                if resource != ORDER_RESOURCE {
                    return Err(GidError::WrongResource(trimmed.to_string()));
                }
                id.split('?').next().unwrap_or_default()
            }
            None => trimmed,
        };

        match numeric.parse::<u64>() {
            Ok(0) | Err(_) => Err(GidError::NotNumeric(trimmed.to_string())),
            Ok(id) => Ok(Self(id)),
        }
    }

    /// The numeric id, as used by the REST API.
    #[must_use]
    pub const fn numeric(&self) -> u64 {
        self.0
    }

    /// The full GID string, as used by the GraphQL API.
    #[must_use]
    pub fn to_gid(&self) -> String {
        format!("{GID_PREFIX}{ORDER_RESOURCE}/{}", self.0)
    }
}

impl fmt::Display for OrderGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderGid {
    type Err = GidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for OrderGid {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
