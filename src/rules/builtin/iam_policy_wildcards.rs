use crate::context::Context;
use crate::hcl::Block;
use crate::rules::{Provider, ResultSink, Rule, RuleDocs, Severity};

/// IAM policy documents granting wildcard actions or resources.
pub fn rule() -> Rule {
    Rule {
        short_code: "no-policy-wildcards",
        legacy_id: Some("AWS099"),
        provider: Provider::Aws,
        service: "iam",
        required_kinds: &["data"],
        required_labels: &[&["aws_iam_policy_document"]],
        default_severity: Severity::High,
        docs: RuleDocs {
            summary: "IAM policy document uses wildcarded actions or resources.",
            explanation: "IAM policies should grant the minimal set of actions on the minimal set of resources. Wildcards grant more access than is ever needed.",
            impact: "Overly permissive policies can allow privilege escalation",
            resolution: "Name the specific actions and resources the policy needs",
            links: &[
                "https://docs.aws.amazon.com/IAM/latest/UserGuide/best-practices.html#grant-least-privilege",
                "https://registry.terraform.io/providers/hashicorp/aws/latest/docs/data-sources/iam_policy_document",
            ],
            good_example: r#"
data "aws_iam_policy_document" "good_example" {
  statement {
    effect    = "Allow"
    actions   = ["s3:GetObject"]
    resources = ["arn:aws:s3:::examplebucket/content"]
  }
}
"#,
            bad_example: r#"
data "aws_iam_policy_document" "bad_example" {
  statement {
    effect    = "Allow"
    actions   = ["s3:*"]
    resources = ["*"]
  }
}
"#,
        },
        check,
    }
}

fn check(sink: &ResultSink<'_>, block: &Block, _ctx: &Context) {
    for statement in block.get_blocks("statement") {
        // Deny statements constrain access; wildcards there are fine.
        if statement
            .get_attribute("effect")
            .is_some_and(|e| e.equals("Deny"))
        {
            continue;
        }
        if let Some(actions) = statement.get_attribute("actions") {
            if actions.string_items().iter().any(|a| a.contains('*')) {
                sink.flag_at(
                    statement.range(),
                    format!(
                        "Resource '{}' defines a policy with wildcard actions.",
                        block.full_name()
                    ),
                );
            }
        }
        if let Some(resources) = statement.get_attribute("resources") {
            if resources.string_items().iter().any(|r| *r == "*") {
                sink.flag_at(
                    statement.range(),
                    format!(
                        "Resource '{}' defines a policy with wildcard resources.",
                        block.full_name()
                    ),
                );
            }
        }
    }
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
    fn wildcard_action_and_resource_each_produce_a_result() {
        let set = scan(
            "data \"aws_iam_policy_document\" \"p\" {\n  statement {\n    actions   = [\"s3:*\"]\n    resources = [\"*\"]\n  }\n}\n",
        );
        assert_eq!(set.of_rule("aws-iam-no-policy-wildcards").count(), 2);
    }

    #[test]
    fn scoped_statement_is_clean() {
        let set = scan(
            "data \"aws_iam_policy_document\" \"p\" {\n  statement {\n    actions   = [\"s3:GetObject\"]\n    resources = [\"arn:aws:s3:::bucket/key\"]\n  }\n}\n",
        );
        assert!(!set.contains("aws-iam-no-policy-wildcards"));
    }

    #[test]
    fn deny_statements_may_use_wildcards() {
        let set = scan(
            "data \"aws_iam_policy_document\" \"p\" {\n  statement {\n    effect    = \"Deny\"\n    actions   = [\"*\"]\n    resources = [\"*\"]\n  }\n}\n",
        );
        assert!(!set.contains("aws-iam-no-policy-wildcards"));
    }

    #[test]
    fn wildcard_arn_suffix_is_not_a_wildcard_resource() {
        let set = scan(
            "data \"aws_iam_policy_document\" \"p\" {\n  statement {\n    actions   = [\"s3:GetObject\"]\n    resources = [\"arn:aws:s3:::bucket/*\"]\n  }\n}\n",
        );
        assert!(!set.contains("aws-iam-no-policy-wildcards"));
    }

    #[test]
    fn resource_kind_blocks_are_ignored() {
        let set = scan(
            "resource \"aws_iam_policy_document\" \"p\" {\n  statement {\n    actions = [\"*\"]\n  }\n}\n",
        );
        assert!(set.is_empty());
    }
}
