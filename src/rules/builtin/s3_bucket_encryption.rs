use crate::context::Context;
use crate::hcl::Block;
use crate::rules::{Provider, ResultSink, Rule, RuleDocs, Severity};

/// S3 buckets without server-side encryption configured.
pub fn rule() -> Rule {
    Rule {
        short_code: "enable-bucket-encryption",
        legacy_id: Some("AWS017"),
        provider: Provider::Aws,
        service: "s3",
        required_kinds: &["resource"],
        required_labels: &[&["aws_s3_bucket"]],
        default_severity: Severity::High,
        docs: RuleDocs {
            summary: "Unencrypted S3 bucket.",
            explanation: "S3 buckets should be encrypted at rest to protect the stored objects.",
            impact: "The bucket objects could be read if compromised",
            resolution: "Configure a server_side_encryption_configuration block on the bucket",
            links: &[
                "https://docs.aws.amazon.com/AmazonS3/latest/dev/bucket-encryption.html",
                "https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket",
            ],
            good_example: r#"
resource "aws_s3_bucket" "good_example" {
  server_side_encryption_configuration {
    rule {
      apply_server_side_encryption_by_default {
        sse_algorithm = "aws:kms"
      }
    }
  }
}
"#,
            bad_example: r#"
resource "aws_s3_bucket" "bad_example" {
  acl = "private"
}
"#,
        },
        check,
    }
}

fn check(sink: &ResultSink<'_>, block: &Block, _ctx: &Context) {
    if block.get_block("server_side_encryption_configuration").is_none() {
        sink.flag(
            block,
            format!(
                "Resource '{}' defines an unencrypted S3 bucket.",
                block.full_name()
            ),
        );
    }
}
