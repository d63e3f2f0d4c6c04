//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! The configured severity decides which violations invalidate a chain.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::config::{CodecConfig, Severity};
use crate::escape::{ESCAPE, FIELD_SEPARATOR, NODE_SEPARATOR};
use crate::model::SupplyChain;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("static pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationReason {
    /// Required field empty, or optional field present but empty.
    Empty,
    TooLong { len: usize, max: usize },
    BadVersion,
    NoNodes,
    /// Contains `,`, `!` or `\`.
    ReservedCharacter,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationReason::Empty => f.write_str("must not be empty"),
            ViolationReason::TooLong { len, max } => {
                write!(f, "is {} characters, limit is {}", len, max)
            }
            ViolationReason::BadVersion => f.write_str("must be <major>.<minor>"),
            ViolationReason::NoNodes => f.write_str("must contain at least one node"),
            ViolationReason::ReservedCharacter => {
                f.write_str("must not contain ',', '!' or '\\'")
            }
        }
    }
}

/// One violation. `index` is the 0-based node index for node-level fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub index: Option<usize>,
    pub field: &'static str,
    pub reason: ViolationReason,
    pub severity: Severity,
}

impl ValidationError {
    fn chain(field: &'static str, reason: ViolationReason) -> Self {
        Self { index: None, field, reason, severity: Severity::Error }
    }

    fn node(index: usize, field: &'static str, reason: ViolationReason) -> Self {
        Self { index: Some(index), field, reason, severity: Severity::Error }
    }

    fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "nodes[{}].{} {}", i, self.field, self.reason),
            None => write!(f, "{} {}", self.field, self.reason),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.violations.iter().filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationError> {
        self.violations.iter().filter(|v| v.severity == Severity::Warning)
    }

    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self
                .violations
                .into_iter()
                .filter(|v| v.severity == Severity::Error)
                .collect())
        }
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, chain: &SupplyChain, config: &CodecConfig) -> Vec<ValidationError>;
}

// --- Concrete Rules ---

pub struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &'static str { "version" }

    fn validate(&self, chain: &SupplyChain, _config: &CodecConfig) -> Vec<ValidationError> {
        if VERSION_RE.is_match(&chain.ver) {
            vec![]
        } else {
            vec![ValidationError::chain("ver", ViolationReason::BadVersion)]
        }
    }
}

pub struct NodesPresentRule;

impl ValidationRule for NodesPresentRule {
    fn name(&self) -> &'static str { "nodes_present" }

    fn validate(&self, chain: &SupplyChain, _config: &CodecConfig) -> Vec<ValidationError> {
        if chain.nodes.is_empty() {
            vec![ValidationError::chain("nodes", ViolationReason::NoNodes)]
        } else {
            vec![]
        }
    }
}

pub struct RequiredFieldsRule;

impl ValidationRule for RequiredFieldsRule {
    fn name(&self) -> &'static str { "required_fields" }

    fn validate(&self, chain: &SupplyChain, _config: &CodecConfig) -> Vec<ValidationError> {
        let mut violations = vec![];
        for (i, node) in chain.nodes.iter().enumerate() {
            if node.asi.is_empty() {
                violations.push(ValidationError::node(i, "asi", ViolationReason::Empty));
            }
            if node.sid.is_empty() {
                violations.push(ValidationError::node(i, "sid", ViolationReason::Empty));
            }
        }
        violations
    }
}

/// `asi` is a domain name; delimiters never belong in one.
pub struct AsiCharactersRule;

impl ValidationRule for AsiCharactersRule {
    fn name(&self) -> &'static str { "asi_characters" }

    fn validate(&self, chain: &SupplyChain, _config: &CodecConfig) -> Vec<ValidationError> {
        chain
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.asi.contains([FIELD_SEPARATOR, NODE_SEPARATOR, ESCAPE]))
            .map(|(i, _)| ValidationError::node(i, "asi", ViolationReason::ReservedCharacter))
            .collect()
    }
}

pub struct SidLengthRule;

impl ValidationRule for SidLengthRule {
    fn name(&self) -> &'static str { "sid_length" }

    fn validate(&self, chain: &SupplyChain, config: &CodecConfig) -> Vec<ValidationError> {
        let max = config.max_sid_length;
        chain
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let len = node.sid.chars().count();
                (len > max).then(|| {
                    ValidationError::node(i, "sid", ViolationReason::TooLong { len, max })
                        .with_severity(config.sid_length_severity)
                })
            })
            .collect()
    }
}

/// The wire format cannot carry `Some("")`; it decodes as absent.
pub struct OptionalFieldsRule;

impl ValidationRule for OptionalFieldsRule {
    fn name(&self) -> &'static str { "optional_fields" }

    fn validate(&self, chain: &SupplyChain, _config: &CodecConfig) -> Vec<ValidationError> {
        let mut violations = vec![];
        for (i, node) in chain.nodes.iter().enumerate() {
            let fields = [("rid", &node.rid), ("name", &node.name), ("domain", &node.domain)];
            for (field, value) in fields {
                if value.as_deref() == Some("") {
                    violations.push(ValidationError::node(i, field, ViolationReason::Empty));
                }
            }
        }
        violations
    }
}

/// Validator orchestrates rules and applies severity policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    config: CodecConfig,
}

impl Validator {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            rules: vec![
                Box::new(VersionRule),
                Box::new(NodesPresentRule),
                Box::new(RequiredFieldsRule),
                Box::new(AsiCharactersRule),
                Box::new(SidLengthRule),
                Box::new(OptionalFieldsRule),
            ],
            config,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Run every rule; never stops at the first violation.
    pub fn check(&self, chain: &SupplyChain) -> ValidationReport {
        let mut violations = vec![];
        for rule in &self.rules {
            let found = rule.validate(chain, &self.config);
            if !found.is_empty() {
                tracing::trace!(rule = rule.name(), count = found.len(), "rule reported violations");
            }
            violations.extend(found);
        }

        // Chain-level first, then by node index; stable within an index.
        violations.sort_by_key(|v| v.index);

        for warning in violations.iter().filter(|v| v.severity == Severity::Warning) {
            tracing::warn!(violation = %warning, "supply chain warning");
        }

        let valid = !violations.iter().any(|v| v.severity == Severity::Error);
        ValidationReport { valid, violations }
    }

    pub fn validate(&self, chain: &SupplyChain) -> Result<(), Vec<ValidationError>> {
        self.check(chain).into_result()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

/// Validate with the default configuration.
pub fn validate(chain: &SupplyChain) -> Result<(), Vec<ValidationError>> {
    Validator::default().validate(chain)
}
