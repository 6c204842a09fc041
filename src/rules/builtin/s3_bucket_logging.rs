use crate::context::Context;
use crate::hcl::Block;
use crate::rules::{Provider, ResultSink, Rule, RuleDocs, Severity};

/// S3 buckets without access logging.
pub fn rule() -> Rule {
    Rule {
        short_code: "enable-bucket-logging",
        legacy_id: Some("AWS002"),
        provider: Provider::Aws,
        service: "s3",
        required_kinds: &["resource"],
        required_labels: &[&["aws_s3_bucket"]],
        default_severity: Severity::Medium,
        docs: RuleDocs {
            summary: "S3 Bucket does not have logging enabled.",
            explanation: "Buckets should have logging enabled so that access can be audited.",
            impact: "There is no way to determine the access to this bucket",
            resolution: "Add a logging block to the resource to enable access logging",
            links: &[
                "https://docs.aws.amazon.com/AmazonS3/latest/dev/ServerLogs.html",
                "https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket",
            ],
            good_example: r#"
resource "aws_s3_bucket" "good_example" {
  logging {
    target_bucket = "target-bucket"
  }
}
"#,
            bad_example: r#"
resource "aws_s3_bucket" "bad_example" {
}
"#,
        },
        check,
    }
}

fn check(sink: &ResultSink<'_>, block: &Block, _ctx: &Context) {
    if block.get_block("logging").is_some() {
        return;
    }
    // Buckets that receive access logs are themselves exempt.
    if block
        .get_attribute("acl")
        .is_some_and(|acl| acl.equals("log-delivery-write"))
    {
        return;
    }
    sink.flag(
        block,
        format!(
            "Resource '{}' does not have logging enabled.",
            block.full_name()
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleEngine;
    use crate::hcl;
    use crate::rules::{Registry, ResultSet};

    fn scan(src: &str) -> ResultSet {
        let blocks = hcl::parse("test.tf", src).expect("parse failed");
        let registry = Registry::build(vec![rule()]).expect("registry");
        RuleEngine::with_registry(&registry).scan(&blocks, &Context::default())
    }

    #[test]
    fn bucket_without_logging_is_flagged() {
        let set = scan("resource \"aws_s3_bucket\" \"assets\" {\n}\n");
        let results: Vec<_> = set.of_rule("aws-s3-enable-bucket-logging").collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].description.contains("aws_s3_bucket.assets"));
    }

    #[test]
    fn bucket_with_logging_is_clean() {
        let set = scan(
            "resource \"aws_s3_bucket\" \"assets\" {\n  logging {\n    target_bucket = \"logs\"\n  }\n}\n",
        );
        assert!(!set.contains("aws-s3-enable-bucket-logging"));
    }

    #[test]
    fn log_delivery_acl_is_exempt() {
        let set = scan("resource \"aws_s3_bucket\" \"logs\" {\n  acl = \"log-delivery-write\"\n}\n");
        assert!(!set.contains("aws-s3-enable-bucket-logging"));
    }

    #[test]
    fn other_acl_values_are_not_exempt() {
        let set = scan("resource \"aws_s3_bucket\" \"assets\" {\n  acl = \"private\"\n}\n");
        assert!(set.contains("aws-s3-enable-bucket-logging"));
    }
}
