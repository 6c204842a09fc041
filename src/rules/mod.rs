//! Rule definitions and the process-wide registry.
//!
//! A rule is data plus one check function: identity, provider/service
//! classification, the block kinds and label prefixes it applies to, a
//! default severity, a documentation bundle whose good/bad examples are
//! executable, and the check itself. Rules never run each other and never
//! see each other's findings.

pub mod builtin;
pub mod policy;
pub mod result;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::{GuardError, Result};
use crate::hcl::Block;

pub use result::{ResultSet, ResultSink, RuleFault, ScanResult, Severity};

/// Cloud provider a rule targets. Used for classification and identity,
/// not for applicability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Azure,
    Google,
    General,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Azure => write!(f, "azure"),
            Self::Google => write!(f, "google"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Documentation bundle published with each rule. `good_example` must scan
/// clean for the rule; `bad_example` must be flagged by it.
#[derive(Debug, Clone)]
pub struct RuleDocs {
    pub summary: &'static str,
    pub explanation: &'static str,
    pub impact: &'static str,
    pub resolution: &'static str,
    pub links: &'static [&'static str],
    pub good_example: &'static str,
    pub bad_example: &'static str,
}

/// Signature of a rule check: contribute findings to the sink, touch
/// nothing else.
pub type CheckFn = fn(&ResultSink<'_>, &Block, &Context);

/// One registered rule. Immutable once the registry is built.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Short code unique within the provider/service, e.g.
    /// `enable-bucket-logging`.
    pub short_code: &'static str,
    /// Identity carried over from earlier releases, e.g. `AWS002`.
    pub legacy_id: Option<&'static str>,
    pub provider: Provider,
    pub service: &'static str,
    /// Block kinds this rule runs against (`resource`, `data`, ...).
    pub required_kinds: &'static [&'static str],
    /// Acceptable label prefixes; empty means any labels.
    pub required_labels: &'static [&'static [&'static str]],
    pub default_severity: Severity,
    pub docs: RuleDocs,
    pub check: CheckFn,
}

impl Rule {
    /// Primary identity: `provider-service-shortcode`.
    pub fn id(&self) -> String {
        format!("{}-{}-{}", self.provider, self.service, self.short_code)
    }

    /// Whether this rule should run against the given block.
    pub fn applies_to(&self, block: &Block) -> bool {
        if !self.required_kinds.iter().any(|k| *k == block.kind()) {
            return false;
        }
        if self.required_labels.is_empty() {
            return true;
        }
        self.required_labels.iter().any(|prefix| {
            prefix.len() <= block.labels().len()
                && prefix
                    .iter()
                    .zip(block.labels())
                    .all(|(want, have)| *want == have.as_str())
        })
    }
}

/// Append-only store of all known rules, ordered lexicographically by
/// identity so iteration is reproducible regardless of declaration order.
#[derive(Debug, Default)]
pub struct Registry {
    rules: Vec<Rule>,
}

impl Registry {
    /// Build a registry from a rule list. A duplicate primary identity or
    /// legacy alias is an authoring bug and fails construction.
    pub fn build(mut rules: Vec<Rule>) -> Result<Self> {
        rules.sort_by(|a, b| a.id().cmp(&b.id()));

        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.id()) {
                return Err(GuardError::DuplicateRule { id: rule.id() });
            }
            if let Some(legacy) = rule.legacy_id {
                if !seen.insert(legacy.to_string()) {
                    return Err(GuardError::DuplicateRule {
                        id: legacy.to_string(),
                    });
                }
            }
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look a rule up by primary identity or legacy alias.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.id() == id || r.legacy_id == Some(id))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The process-wide registry of built-in rules. Populated on first use,
/// read-only thereafter.
pub fn registry() -> &'static Registry {
    static REGISTRY: Lazy<Registry> = Lazy::new(|| {
        // A duplicate identity is a bug in the rule set, not a runtime
        // condition; surface it at first use.
        Registry::build(builtin::all_rules())
            .unwrap_or_else(|e| panic!("rule registry construction failed: {e}"))
    });
    &REGISTRY
}
