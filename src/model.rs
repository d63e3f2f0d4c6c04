//! SupplyChain Value Types
//!
//! Immutable values exchanged with the transport layer. All behaviour lives in
//! the codec and validation modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A `0 | 1` field (`hp`, `complete`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Flag {
    No,
    Yes,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("flag must be 0 or 1, found {0:?}")]
pub struct InvalidFlag(pub String);

impl Flag {
    pub fn as_str(self) -> &'static str {
        match self {
            Flag::No => "0",
            Flag::Yes => "1",
        }
    }
}

impl TryFrom<u8> for Flag {
    type Error = InvalidFlag;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Flag::No),
            1 => Ok(Flag::Yes),
            other => Err(InvalidFlag(other.to_string())),
        }
    }
}

impl From<Flag> for u8 {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::No => 0,
            Flag::Yes => 1,
        }
    }
}

/// Wire form: exactly `"0"` or `"1"`, no sign, padding or whitespace.
impl FromStr for Flag {
    type Err = InvalidFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Flag::No),
            "1" => Ok(Flag::Yes),
            other => Err(InvalidFlag(other.to_string())),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entity in the payment flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyChainNode {
    /// Advertising system identifier (domain name).
    pub asi: String,
    /// Seller identifier within `asi`.
    pub sid: String,
    /// Payment-handling flag.
    pub hp: Flag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl SupplyChainNode {
    pub fn new(asi: impl Into<String>, sid: impl Into<String>, hp: Flag) -> Self {
        Self {
            asi: asi.into(),
            sid: sid.into(),
            hp,
            rid: None,
            name: None,
            domain: None,
        }
    }

    pub fn with_rid(mut self, rid: impl Into<String>) -> Self {
        self.rid = Some(rid.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

/// The full chain. `nodes[0]` is the first known node, the last node sent
/// the current bid request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyChain {
    pub ver: String,
    pub complete: Flag,
    pub nodes: Vec<SupplyChainNode>,
}

impl SupplyChain {
    pub fn new(ver: impl Into<String>, complete: Flag, nodes: Vec<SupplyChainNode>) -> Self {
        Self {
            ver: ver.into(),
            complete,
            nodes,
        }
    }
}
