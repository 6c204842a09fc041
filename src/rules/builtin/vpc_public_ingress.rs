use crate::context::Context;
use crate::hcl::Block;
use crate::rules::{Provider, ResultSink, Rule, RuleDocs, Severity};

/// Security groups or standalone rules allowing ingress from anywhere.
pub fn rule() -> Rule {
    Rule {
        short_code: "no-public-ingress-sgr",
        legacy_id: Some("AWS006"),
        provider: Provider::Aws,
        service: "vpc",
        required_kinds: &["resource"],
        required_labels: &[&["aws_security_group_rule"], &["aws_security_group"]],
        default_severity: Severity::Critical,
        docs: RuleDocs {
            summary: "An ingress security group rule allows traffic from /0.",
            explanation: "Opening up ports to the public internet is generally to be avoided. You should restrict ingress to the minimal set of address ranges that need it.",
            impact: "The port is exposed for ingress from the entire internet",
            resolution: "Set a more restrictive CIDR range on the ingress rule",
            links: &[
                "https://docs.aws.amazon.com/AWSEC2/latest/UserGuide/security-group-rules-reference.html",
                "https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/security_group_rule",
            ],
            good_example: r#"
resource "aws_security_group_rule" "good_example" {
  type        = "ingress"
  cidr_blocks = ["10.0.0.0/16"]
}
"#,
            bad_example: r#"
resource "aws_security_group_rule" "bad_example" {
  type        = "ingress"
  cidr_blocks = ["0.0.0.0/0"]
}
"#,
        },
        check,
    }
}

fn check(sink: &ResultSink<'_>, block: &Block, _ctx: &Context) {
    match block.labels().first().map(String::as_str) {
        Some("aws_security_group_rule") => {
            let is_ingress = block
                .get_attribute("type")
                .is_some_and(|t| t.equals("ingress"));
            if is_ingress && open_to_world(block) {
                sink.flag(
                    block,
                    format!(
                        "Resource '{}' defines a fully open ingress security group rule.",
                        block.full_name()
                    ),
                );
            }
        }
        Some("aws_security_group") => {
            for ingress in block.get_blocks("ingress") {
                if open_to_world(ingress) {
                    sink.flag_at(
                        ingress.range(),
                        format!(
                            "Resource '{}' defines a fully open ingress security group.",
                            block.full_name()
                        ),
                    );
                }
            }
        }
        _ => {}
    }
}

fn open_to_world(block: &Block) -> bool {
    ["cidr_blocks", "ipv6_cidr_blocks"].iter().any(|name| {
        block
            .get_attribute(name)
            .is_some_and(|cidrs| cidrs.contains("0.0.0.0/0") || cidrs.contains("::/0"))
    })
}
