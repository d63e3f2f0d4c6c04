//! Chain Codec - Single Entry Point
//!
//! Wire form: `<ver>,<complete>!<node>!<node>...`
//!
//! Decode MUST run the validator before handing a chain back. No bypass.

use thiserror::Error;

use crate::config::CodecConfig;
use crate::escape::{escape, split_unescaped, unescape, FIELD_SEPARATOR, NODE_SEPARATOR};
use crate::hashing::fingerprint_raw;
use crate::model::{Flag, SupplyChain};
use crate::node::{decode_node_with, encode_node, NodeError};
use crate::validation::{ValidationError, Validator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Supply chain has no nodes")]
    EmptyChain,

    #[error("Invalid node at index {index}: {cause}")]
    InvalidNode {
        index: usize,
        #[source]
        cause: NodeError,
    },

    #[error("Validation failed: {}", join_violations(.0))]
    Invalid(Vec<ValidationError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Validation failed: {}", join_violations(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_violations(violations: &[ValidationError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Codec bound to one configuration. Stateless apart from that, so a single
/// instance can be shared across threads.
pub struct Codec {
    validator: Validator,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            validator: Validator::new(config),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        self.validator.config()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Decode and validate a wire string. Fails atomically.
    pub fn decode(&self, raw: &str) -> Result<SupplyChain, DecodeError> {
        let result = self.decode_inner(raw);
        match &result {
            Ok(chain) => tracing::debug!(
                nodes = chain.nodes.len(),
                complete = %chain.complete,
                "decoded supply chain"
            ),
            Err(e) => tracing::warn!(
                fingerprint = %fingerprint_raw(raw),
                error = %e,
                "rejected supply chain"
            ),
        }
        result
    }

    fn decode_inner(&self, raw: &str) -> Result<SupplyChain, DecodeError> {
        let mut segments = split_unescaped(raw, NODE_SEPARATOR).into_iter();
        let header = segments.next().unwrap_or_default();
        let (ver, complete) = decode_header(header)?;

        let segments: Vec<&str> = segments.collect();
        if segments.is_empty() || segments == [""] {
            return Err(DecodeError::EmptyChain);
        }

        let nodes = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                decode_node_with(segment, self.config())
                    .map_err(|cause| DecodeError::InvalidNode { index, cause })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let chain = SupplyChain { ver, complete, nodes };

        // MANDATORY: a decoded chain is always validated.
        self.validator.validate(&chain).map_err(DecodeError::Invalid)?;

        Ok(chain)
    }

    /// Encode without validating. The caller guarantees `chain` is valid.
    pub fn encode(&self, chain: &SupplyChain) -> String {
        let mut out = format!("{}{}{}", escape(&chain.ver), FIELD_SEPARATOR, chain.complete);
        for node in &chain.nodes {
            out.push(NODE_SEPARATOR);
            out.push_str(&encode_node(node));
        }
        out
    }

    /// Encode, validating first when `validate_on_encode` is set.
    pub fn encode_checked(&self, chain: &SupplyChain) -> Result<String, EncodeError> {
        if self.config().validate_on_encode {
            self.validator.validate(chain).map_err(EncodeError::Invalid)?;
        }
        Ok(self.encode(chain))
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

fn decode_header(header: &str) -> Result<(String, Flag), DecodeError> {
    let fields = split_unescaped(header, FIELD_SEPARATOR);
    let [ver, complete] = fields.as_slice() else {
        return Err(DecodeError::MalformedHeader(format!(
            "expected ver and complete, found {} field(s)",
            fields.len()
        )));
    };

    let ver = unescape(ver).map_err(|e| DecodeError::MalformedHeader(e.to_string()))?;
    let complete = complete.parse::<Flag>().map_err(|_| {
        DecodeError::MalformedHeader(format!("complete must be 0 or 1, found {:?}", complete))
    })?;

    Ok((ver, complete))
}

/// Decode and validate with the default configuration.
pub fn decode(raw: &str) -> Result<SupplyChain, DecodeError> {
    Codec::default().decode(raw)
}

/// Encode without validating.
pub fn encode(chain: &SupplyChain) -> String {
    Codec::default().encode(chain)
}

/// Validate, then encode.
pub fn encode_checked(chain: &SupplyChain) -> Result<String, EncodeError> {
    Codec::new(CodecConfig {
        validate_on_encode: true,
        ..CodecConfig::default()
    })
    .encode_checked(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Severity;
    use crate::model::SupplyChainNode;
    use crate::validation::ViolationReason;

    #[test]
    fn test_decode_header_fields() {
        let chain = decode("1.0,0!a.com,s,1").unwrap();
        assert_eq!(chain.ver, "1.0");
        assert_eq!(chain.complete, Flag::No);
    }

    #[test]
    fn test_header_wrong_arity() {
        assert!(matches!(decode("1.0!a,b,1"), Err(DecodeError::MalformedHeader(_))));
        assert!(matches!(decode("1.0,1,x!a,b,1"), Err(DecodeError::MalformedHeader(_))));
        assert!(matches!(decode("!a,b,1"), Err(DecodeError::MalformedHeader(_))));
        assert!(matches!(decode(""), Err(DecodeError::MalformedHeader(_))));
    }

    #[test]
    fn test_header_bad_complete() {
        assert!(matches!(decode("1.0,2!a,b,1"), Err(DecodeError::MalformedHeader(_))));
        assert!(matches!(decode("1.0,!a,b,1"), Err(DecodeError::MalformedHeader(_))));
    }

    #[test]
    fn test_header_bad_escape() {
        assert!(matches!(decode(r"1\.0,1!a,b,1"), Err(DecodeError::MalformedHeader(_))));
    }

    #[test]
    fn test_empty_chain() {
        assert_eq!(decode("1.0,1"), Err(DecodeError::EmptyChain));
        assert_eq!(decode("1.0,1!"), Err(DecodeError::EmptyChain));
    }

    #[test]
    fn test_invalid_node_carries_index() {
        let err = decode("1.0,1!a.com,s,1!b.com,t,9").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidNode {
                index: 1,
                cause: NodeError::InvalidHpValue("9".into()),
            }
        );
    }

    #[test]
    fn test_empty_trailing_segment_is_invalid_node() {
        let err = decode("1.0,1!a.com,s,1!").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidNode { index: 1, cause: NodeError::MissingRequiredField(1) }
        );
    }

    #[test]
    fn test_decode_runs_validator() {
        let DecodeError::Invalid(violations) = decode("v1,1!,s,1").unwrap_err() else {
            panic!("expected validation failure");
        };
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "ver");
        assert_eq!(violations[1].index, Some(0));
        assert_eq!(violations[1].field, "asi");
        assert_eq!(violations[1].reason, ViolationReason::Empty);
    }

    #[test]
    fn test_escaped_separator_in_node() {
        let chain = decode(r"1.0,1!a.com,s\!1,1").unwrap();
        assert_eq!(chain.nodes.len(), 1);
        assert_eq!(chain.nodes[0].sid, "s!1");
    }

    #[test]
    fn test_encode_multi_node() {
        let chain = SupplyChain::new(
            "1.0",
            Flag::Yes,
            vec![
                SupplyChainNode::new("exchange1.com", "1234", Flag::Yes).with_rid("bid-1"),
                SupplyChainNode::new("ssp2.com", "abcd", Flag::Yes),
            ],
        );
        assert_eq!(encode(&chain), "1.0,1!exchange1.com,1234,1,bid-1!ssp2.com,abcd,1");
    }

    #[test]
    fn test_encode_checked_rejects_invalid() {
        let chain = SupplyChain::new("1.0", Flag::Yes, vec![]);
        let err = encode_checked(&chain).unwrap_err();
        assert!(err.to_string().contains("nodes must contain at least one node"));
    }

    #[test]
    fn test_codec_encode_checked_skips_validation_by_default() {
        let chain = SupplyChain::new("1.0", Flag::Yes, vec![]);
        assert_eq!(Codec::default().encode_checked(&chain).unwrap(), "1.0,1");
    }

    #[test]
    fn test_lenient_sid_length() {
        let codec = Codec::new(CodecConfig {
            sid_length_severity: Severity::Warning,
            ..CodecConfig::default()
        });
        let raw = format!("1.0,1!a.com,{},1", "x".repeat(80));
        let chain = codec.decode(&raw).unwrap();
        assert_eq!(chain.nodes[0].sid.len(), 80);
        assert_eq!(codec.encode(&chain), raw);
    }

    #[test]
    fn test_codec_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Codec>();
    }
}
