use std::collections::BTreeSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::hcl::{Block, Range};

use super::Rule;

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// One finding produced by a rule against a specific block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Identity of the rule that produced the finding.
    pub rule_id: String,
    /// Legacy alias of the rule, if it has one.
    pub legacy_id: Option<String>,
    /// Human-readable description referencing the offending block.
    pub description: String,
    pub severity: Severity,
    pub range: Range,
}

/// A rule check that panicked. Kept apart from findings so a broken rule
/// is never mistaken for a detected misconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFault {
    pub rule_id: String,
    pub block: String,
    pub range: Range,
    pub message: String,
}

/// Append point handed to a rule's check. Stamps each finding with the
/// owning rule's identity and default severity; synchronized so checks
/// may contribute from parallel workers.
pub struct ResultSink<'a> {
    rule_id: String,
    legacy_id: Option<&'static str>,
    default_severity: Severity,
    out: &'a Mutex<Vec<ScanResult>>,
}

impl<'a> ResultSink<'a> {
    pub(crate) fn new(rule: &Rule, out: &'a Mutex<Vec<ScanResult>>) -> Self {
        Self {
            rule_id: rule.id(),
            legacy_id: rule.legacy_id,
            default_severity: rule.default_severity,
            out,
        }
    }

    /// Record a finding against `block` at the rule's default severity.
    pub fn flag(&self, block: &Block, description: impl Into<String>) {
        self.push(description.into(), block.range().clone(), self.default_severity);
    }

    /// Record a finding at a narrower range than the whole block.
    pub fn flag_at(&self, range: &Range, description: impl Into<String>) {
        self.push(description.into(), range.clone(), self.default_severity);
    }

    /// Record a finding at an explicit severity.
    pub fn flag_with_severity(
        &self,
        block: &Block,
        description: impl Into<String>,
        severity: Severity,
    ) {
        self.push(description.into(), block.range().clone(), severity);
    }

    fn push(&self, description: String, range: Range, severity: Severity) {
        let result = ScanResult {
            rule_id: self.rule_id.clone(),
            legacy_id: self.legacy_id.map(str::to_string),
            description,
            severity,
            range,
        };
        if let Ok(mut out) = self.out.lock() {
            out.push(result);
        }
    }
}

/// All findings and rule faults from one scan invocation.
#[derive(Debug, Default, Clone)]
pub struct ResultSet {
    results: Vec<ScanResult>,
    faults: Vec<RuleFault>,
}

impl ResultSet {
    pub(crate) fn new(results: Vec<ScanResult>, faults: Vec<RuleFault>) -> Self {
        Self { results, faults }
    }

    pub fn results(&self) -> &[ScanResult] {
        &self.results
    }

    pub fn faults(&self) -> &[RuleFault] {
        &self.faults
    }

    /// True when some finding carries the given rule identity (primary or
    /// legacy).
    pub fn contains(&self, rule_id: &str) -> bool {
        self.results
            .iter()
            .any(|r| r.rule_id == rule_id || r.legacy_id.as_deref() == Some(rule_id))
    }

    pub fn of_rule<'s>(&'s self, rule_id: &'s str) -> impl Iterator<Item = &'s ScanResult> {
        self.results.iter().filter(move |r| r.rule_id == rule_id)
    }

    /// Identities present in this set. Two scans of the same input must
    /// agree on this.
    pub fn rule_ids(&self) -> BTreeSet<&str> {
        self.results.iter().map(|r| r.rule_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rule_id: &str, legacy: Option<&str>) -> ScanResult {
        ScanResult {
            rule_id: rule_id.to_string(),
            legacy_id: legacy.map(str::to_string),
            description: "test".to_string(),
            severity: Severity::Medium,
            range: Range {
                file: "main.tf".to_string(),
                start_line: 1,
                end_line: 1,
            },
        }
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_parses_leniently() {
        assert_eq!(Severity::from_str_lenient("HIGH"), Some(Severity::High));
        assert_eq!(Severity::from_str_lenient("crit"), Some(Severity::Critical));
        assert_eq!(Severity::from_str_lenient("nope"), None);
    }

    #[test]
    fn contains_matches_primary_and_legacy_ids() {
        let set = ResultSet::new(
            vec![result("aws-s3-enable-bucket-logging", Some("AWS002"))],
            Vec::new(),
        );
        assert!(set.contains("aws-s3-enable-bucket-logging"));
        assert!(set.contains("AWS002"));
        assert!(!set.contains("AWS001"));
    }

    #[test]
    fn of_rule_filters_by_identity() {
        let set = ResultSet::new(
            vec![result("a", None), result("b", None), result("a", None)],
            Vec::new(),
        );
        assert_eq!(set.of_rule("a").count(), 2);
        assert_eq!(set.rule_ids().len(), 2);
    }
}
