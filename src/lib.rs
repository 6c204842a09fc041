//! terraguard — static analysis security scanner for Terraform
//! configurations.
//!
//! Parses declarative resource definitions, evaluates a registry of
//! independent security rules against each matching declaration, and
//! reports findings with a source location, description, and severity.
//! Every rule's documented good/bad examples are executable: the test
//! suite runs them through the scanner and holds the rule to its claims.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use terraguard::{scan, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let report = scan(Path::new("./infrastructure"), &options).unwrap();
//! println!("Pass: {}, Findings: {}", report.verdict.pass, report.results.len());
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod hcl;
pub mod output;
pub mod rules;

use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use config::Config;
use context::Context;
use engine::RuleEngine;
use error::Result;
use output::OutputFormat;
use rules::policy::PolicyVerdict;
use rules::{ResultSet, RuleFault, ScanResult, Severity};

/// Options for a scan invocation.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Path to config file (defaults to `.terraguard.toml` in the scan dir).
    pub config_path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// CLI override for the fail_on threshold.
    pub fail_on_override: Option<Severity>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            fail_on_override: None,
        }
    }
}

/// Complete scan report.
#[derive(Debug)]
pub struct ScanReport {
    pub target_name: String,
    pub results: Vec<ScanResult>,
    pub faults: Vec<RuleFault>,
    pub verdict: PolicyVerdict,
}

/// Run a complete scan: collect `.tf` files, parse, run every rule,
/// apply policy.
pub fn scan(path: &Path, options: &ScanOptions) -> Result<ScanReport> {
    let config_dir = if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    };
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| config_dir.join(".terraguard.toml"));
    let mut config = Config::load(&config_path)?;

    if let Some(fail_on) = options.fail_on_override {
        config.policy.fail_on = fail_on;
    }

    let files = collect_tf_files(path)?;
    let mut blocks = Vec::new();
    for file in &files {
        let src = std::fs::read_to_string(file)?;
        blocks.extend(hcl::parse(&file.display().to_string(), &src)?);
    }
    info!(files = files.len(), blocks = blocks.len(), "scanning");

    let ctx = Context::from_blocks(&blocks);
    let set = RuleEngine::new().scan(&blocks, &ctx);

    let results = config.policy.apply(set.results());
    let verdict = config.policy.evaluate(set.results());

    let target_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ScanReport {
        target_name,
        results,
        faults: set.faults().to_vec(),
        verdict,
    })
}

/// Scan in-memory source against the built-in registry, with no policy
/// applied. `file` is used for ranges only.
pub fn scan_source(file: &str, src: &str) -> Result<ResultSet> {
    let blocks = hcl::parse(file, src)?;
    let ctx = Context::from_blocks(&blocks);
    Ok(RuleEngine::new().scan(&blocks, &ctx))
}

/// Render a scan report in the specified format.
pub fn render_report(report: &ScanReport, format: OutputFormat) -> Result<String> {
    output::render(&report.results, &report.faults, &report.verdict, format)
}

fn collect_tf_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "tf")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn unlogged_bucket_yields_exactly_one_logging_result() {
        let set = scan_source(
            "main.tf",
            r#"
resource "aws_s3_bucket" "unlogged" {
}
"#,
        )
        .expect("scan");
        let results: Vec<_> = set.of_rule("aws-s3-enable-bucket-logging").collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].description.contains("aws_s3_bucket.unlogged"));
    }

    #[test]
    fn logged_bucket_yields_no_logging_result() {
        let set = scan_source(
            "main.tf",
            r#"
resource "aws_s3_bucket" "logged" {
  logging {
    target_bucket = "audit-logs"
  }
}
"#,
        )
        .expect("scan");
        assert!(!set.contains("aws-s3-enable-bucket-logging"));
    }

    #[test]
    fn log_delivery_acl_suppresses_the_logging_result() {
        let set = scan_source(
            "main.tf",
            r#"
resource "aws_s3_bucket" "log_sink" {
  acl = "log-delivery-write"
}
"#,
        )
        .expect("scan");
        assert!(!set.contains("aws-s3-enable-bucket-logging"));
    }

    #[test]
    fn mixed_buckets_yield_one_result_for_the_offender_only() {
        let set = scan_source(
            "main.tf",
            r#"
resource "aws_s3_bucket" "unlogged" {
}

resource "aws_s3_bucket" "logged" {
  logging {
    target_bucket = "audit-logs"
  }
}
"#,
        )
        .expect("scan");
        let results: Vec<_> = set.of_rule("aws-s3-enable-bucket-logging").collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].description.contains("aws_s3_bucket.unlogged"));
        assert!(!results[0].description.contains("aws_s3_bucket.logged"));
    }

    #[test]
    fn directory_scan_collects_tf_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut main_tf = std::fs::File::create(dir.path().join("main.tf")).expect("create");
        write!(main_tf, "resource \"aws_s3_bucket\" \"a\" {{\n}}\n").expect("write");
        let mut ignored = std::fs::File::create(dir.path().join("notes.txt")).expect("create");
        write!(ignored, "not terraform").expect("write");

        let report = scan(dir.path(), &ScanOptions::default()).expect("scan");
        assert!(report.results.iter().any(|r| r.rule_id == "aws-s3-enable-bucket-logging"));
        assert!(!report.verdict.pass);
    }

    #[test]
    fn fail_on_override_raises_the_threshold() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Encrypted bucket: only the medium-severity logging rule fires.
        std::fs::write(
            dir.path().join("main.tf"),
            "resource \"aws_s3_bucket\" \"a\" {\n  server_side_encryption_configuration {\n    rule {\n      apply_server_side_encryption_by_default {\n        sse_algorithm = \"AES256\"\n      }\n    }\n  }\n}\n",
        )
        .expect("write");

        let options = ScanOptions {
            fail_on_override: Some(Severity::High),
            ..ScanOptions::default()
        };
        let report = scan(dir.path(), &options).expect("scan");
        assert!(!report.results.is_empty());
        assert!(report.verdict.pass);
    }

    #[test]
    fn invalid_source_is_a_parse_error() {
        assert!(scan_source("broken.tf", "resource \"aws_s3_bucket\" {").is_err());
    }
}
