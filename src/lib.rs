//! schain-codec - OpenRTB SupplyChain wire codec
//!
//! # Guarantees
//! 1. Decode is atomic: a full validated chain or a structured error
//! 2. Decoded values are always unescaped plain text
//! 3. `decode(encode(c)) == c` for every valid chain
//! 4. Validation reports every violation, not just the first

pub mod model;
pub mod escape;
pub mod node;
pub mod codec;
pub mod validation;
pub mod config;
pub mod hashing;

pub use model::{Flag, SupplyChain, SupplyChainNode};
pub use escape::{escape, unescape, EscapeError};
pub use node::{decode_node, encode_node, NodeError};
pub use codec::{decode, encode, encode_checked, Codec, DecodeError, EncodeError};
pub use validation::{validate, ValidationError, ValidationReport, Validator, ViolationReason};
pub use config::{CodecConfig, ConfigError, Severity};
pub use hashing::{fingerprint, fingerprint_raw};

/// SupplyChain object version this crate emits by default.
pub const SCHAIN_VERSION: &str = "1.0";
/// Default upper bound on `sid`, in characters.
pub const MAX_SID_LENGTH: usize = 64;
