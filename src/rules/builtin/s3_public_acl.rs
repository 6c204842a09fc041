use crate::context::Context;
use crate::hcl::Block;
use crate::rules::{Provider, ResultSink, Rule, RuleDocs, Severity};

const PUBLIC_ACLS: &[&str] = &["public-read", "public-read-write", "website"];

/// S3 buckets whose canned ACL grants public access.
pub fn rule() -> Rule {
    Rule {
        short_code: "no-public-access-acl",
        legacy_id: Some("AWS001"),
        provider: Provider::Aws,
        service: "s3",
        required_kinds: &["resource"],
        required_labels: &[&["aws_s3_bucket"]],
        default_severity: Severity::High,
        docs: RuleDocs {
            summary: "S3 Bucket has an ACL defined which allows public access.",
            explanation: "Buckets with public-read, public-read-write or website ACLs can be read by anyone on the internet.",
            impact: "The contents of the bucket can be accessed publicly",
            resolution: "Apply a more restrictive bucket ACL such as private",
            links: &[
                "https://docs.aws.amazon.com/AmazonS3/latest/dev/acl-overview.html#canned-acl",
                "https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket",
            ],
            good_example: r#"
resource "aws_s3_bucket" "good_example" {
  acl = "private"
}
"#,
            bad_example: r#"
resource "aws_s3_bucket" "bad_example" {
  acl = "public-read"
}
"#,
        },
        check,
    }
}

fn check(sink: &ResultSink<'_>, block: &Block, _ctx: &Context) {
    let Some(acl) = block.get_attribute("acl") else {
        return;
    };
    if PUBLIC_ACLS.iter().any(|public| acl.equals(public)) {
        sink.flag(
            block,
            format!(
                "Resource '{}' has an ACL which allows public access.",
                block.full_name()
            ),
        );
    }
}
