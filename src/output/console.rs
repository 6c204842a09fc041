use crate::rules::policy::PolicyVerdict;
use crate::rules::{RuleFault, ScanResult, Severity};

/// Render findings as console output, grouped by severity then location.
pub fn render(results: &[ScanResult], faults: &[RuleFault], verdict: &PolicyVerdict) -> String {
    let mut output = String::new();

    if results.is_empty() && faults.is_empty() {
        output.push_str("\n  No problems detected.\n\n");
        return output;
    }

    // Sort by severity (critical first), then by location
    let mut sorted: Vec<&ScanResult> = results.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.range.file.cmp(&b.range.file))
            .then_with(|| a.range.start_line.cmp(&b.range.start_line))
    });

    output.push_str(&format!("\n  {} problem(s) detected:\n\n", results.len()));

    for result in &sorted {
        let severity_tag = match result.severity {
            Severity::Critical => "[CRITICAL]",
            Severity::High => "[HIGH]    ",
            Severity::Medium => "[MEDIUM]  ",
            Severity::Low => "[LOW]     ",
        };

        output.push_str(&format!(
            "  {} {} {}\n",
            severity_tag, result.rule_id, result.description
        ));
        output.push_str(&format!("           at {}\n", result.range));
        output.push('\n');
    }

    for fault in faults {
        output.push_str(&format!(
            "  [FAULT]    {} failed against '{}': {}\n\n",
            fault.rule_id, fault.block, fault.message
        ));
    }

    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} (threshold: {}, highest: {})\n\n",
        status,
        verdict.fail_threshold,
        verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string()),
    ));

    output
}
