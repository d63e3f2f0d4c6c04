//! Node Codec
//!
//! One node is `asi,sid,hp[,rid[,name[,domain]]]`, each field escaped.

use thiserror::Error;

use crate::config::CodecConfig;
use crate::escape::{escape, split_unescaped, unescape, EscapeError, FIELD_SEPARATOR};
use crate::model::{Flag, SupplyChainNode};

pub const REQUIRED_FIELDS: usize = 3;
pub const MAX_FIELDS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("Missing required field: expected asi, sid and hp, found {0} field(s)")]
    MissingRequiredField(usize),

    #[error("Too many fields: at most {MAX_FIELDS} allowed, found {0}")]
    TooManyFields(usize),

    #[error("Invalid hp value {0:?}: must be \"0\" or \"1\"")]
    InvalidHpValue(String),

    #[error("Field {field} is {len} characters, limit is {max}")]
    FieldTooLong { field: &'static str, len: usize, max: usize },

    #[error("Invalid escape: {0}")]
    InvalidEscape(#[from] EscapeError),
}

pub fn encode_node(node: &SupplyChainNode) -> String {
    let optional = [&node.rid, &node.name, &node.domain];
    let trailing = optional
        .iter()
        .rposition(|f| f.is_some())
        .map_or(0, |i| i + 1);

    let mut fields = vec![escape(&node.asi), escape(&node.sid), node.hp.as_str().to_string()];
    fields.extend(
        optional[..trailing]
            .iter()
            .map(|f| f.as_deref().map(escape).unwrap_or_default()),
    );
    fields.join(",")
}

/// Decode with the default limits.
pub fn decode_node(segment: &str) -> Result<SupplyChainNode, NodeError> {
    decode_node_with(segment, &CodecConfig::default())
}

pub fn decode_node_with(segment: &str, config: &CodecConfig) -> Result<SupplyChainNode, NodeError> {
    let raw = split_unescaped(segment, FIELD_SEPARATOR);
    if raw.len() < REQUIRED_FIELDS {
        return Err(NodeError::MissingRequiredField(raw.len()));
    }
    if raw.len() > MAX_FIELDS {
        return Err(NodeError::TooManyFields(raw.len()));
    }

    let fields = raw
        .iter()
        .map(|f| unescape(f))
        .collect::<Result<Vec<_>, _>>()?;

    let hp: Flag = fields[2]
        .parse()
        .map_err(|_| NodeError::InvalidHpValue(fields[2].clone()))?;

    let sid_len = fields[1].chars().count();
    if config.sid_length_is_hard() && sid_len > config.max_sid_length {
        return Err(NodeError::FieldTooLong {
            field: "sid",
            len: sid_len,
            max: config.max_sid_length,
        });
    }

    let mut fields = fields.into_iter();
    let asi = fields.next().unwrap_or_default();
    let sid = fields.next().unwrap_or_default();
    fields.next();
    let mut optional = fields.map(|f| if f.is_empty() { None } else { Some(f) });

    Ok(SupplyChainNode {
        asi,
        sid,
        hp,
        rid: optional.next().flatten(),
        name: optional.next().flatten(),
        domain: optional.next().flatten(),
    })
}
