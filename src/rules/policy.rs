use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{ScanResult, Severity};

/// Policy verdict — the final pass/fail decision after applying the
/// ignore list and severity overrides to raw findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_results: usize,
    pub effective_results: usize,
    pub highest_severity: Option<Severity>,
    pub fail_threshold: Severity,
}

/// Policy configuration loaded from `.terraguard.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum severity to fail the scan.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
    /// Rule IDs to ignore entirely.
    #[serde(default)]
    pub ignore_rules: HashSet<String>,
    /// Per-rule severity overrides.
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

fn default_fail_on() -> Severity {
    Severity::Low
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: Severity::Low,
            ignore_rules: HashSet::new(),
            overrides: HashMap::new(),
        }
    }
}

impl Policy {
    fn is_ignored(&self, result: &ScanResult) -> bool {
        self.ignore_rules.contains(&result.rule_id)
            || result
                .legacy_id
                .as_ref()
                .is_some_and(|legacy| self.ignore_rules.contains(legacy))
    }

    fn effective_severity(&self, result: &ScanResult) -> Severity {
        self.overrides
            .get(&result.rule_id)
            .copied()
            .unwrap_or(result.severity)
    }

    /// Evaluate findings against this policy and produce a verdict.
    pub fn evaluate(&self, results: &[ScanResult]) -> PolicyVerdict {
        let effective: Vec<Severity> = results
            .iter()
            .filter(|r| !self.is_ignored(r))
            .map(|r| self.effective_severity(r))
            .collect();

        let highest = effective.iter().copied().max();
        let failed = effective.iter().any(|&sev| sev >= self.fail_on);

        PolicyVerdict {
            pass: !failed,
            total_results: results.len(),
            effective_results: effective.len(),
            highest_severity: highest,
            fail_threshold: self.fail_on,
        }
    }

    /// Filter findings: remove ignored rules, apply overrides.
    pub fn apply(&self, results: &[ScanResult]) -> Vec<ScanResult> {
        results
            .iter()
            .filter(|r| !self.is_ignored(r))
            .map(|r| {
                let mut r = r.clone();
                r.severity = self.effective_severity(&r);
                r
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcl::Range;

    fn result(rule_id: &str, severity: Severity) -> ScanResult {
        ScanResult {
            rule_id: rule_id.to_string(),
            legacy_id: Some("AWS000".to_string()),
            description: "test".to_string(),
            severity,
            range: Range {
                file: "main.tf".to_string(),
                start_line: 1,
                end_line: 1,
            },
        }
    }

    #[test]
    fn default_policy_fails_on_any_finding() {
        let policy = Policy::default();
        let verdict = policy.evaluate(&[result("aws-s3-enable-bucket-logging", Severity::Low)]);
        assert!(!verdict.pass);
        assert_eq!(verdict.highest_severity, Some(Severity::Low));
    }

    #[test]
    fn raised_threshold_passes_lower_findings() {
        let policy = Policy {
            fail_on: Severity::High,
            ..Policy::default()
        };
        let verdict = policy.evaluate(&[result("x", Severity::Medium)]);
        assert!(verdict.pass);
    }

    #[test]
    fn ignore_rule_removes_finding() {
        let mut policy = Policy::default();
        policy.ignore_rules.insert("x".to_string());
        let verdict = policy.evaluate(&[result("x", Severity::Critical)]);
        assert!(verdict.pass);
        assert_eq!(verdict.effective_results, 0);
        assert_eq!(verdict.total_results, 1);
    }

    #[test]
    fn legacy_alias_can_be_ignored() {
        let mut policy = Policy::default();
        policy.ignore_rules.insert("AWS000".to_string());
        let verdict = policy.evaluate(&[result("x", Severity::Critical)]);
        assert!(verdict.pass);
    }

    #[test]
    fn override_downgrades_severity() {
        let policy = Policy {
            fail_on: Severity::High,
            overrides: HashMap::from([("x".to_string(), Severity::Low)]),
            ..Policy::default()
        };
        let verdict = policy.evaluate(&[result("x", Severity::Critical)]);
        assert!(verdict.pass);
        let applied = policy.apply(&[result("x", Severity::Critical)]);
        assert_eq!(applied[0].severity, Severity::Low);
    }
}
