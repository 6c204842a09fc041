use crate::error::Result;
use crate::rules::policy::PolicyVerdict;
use crate::rules::{RuleFault, ScanResult};

use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [ScanResult],
    faults: &'a [RuleFault],
    verdict: &'a PolicyVerdict,
}

/// Render findings as a JSON report.
pub fn render(
    results: &[ScanResult],
    faults: &[RuleFault],
    verdict: &PolicyVerdict,
) -> Result<String> {
    let report = JsonReport {
        results,
        faults,
        verdict,
    };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}
