//! Hard-coded secret detection, for attributes and variable defaults.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::Context;
use crate::hcl::Block;
use crate::rules::{Provider, ResultSink, Rule, RuleDocs, Severity};

static SENSITIVE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|secret|token|api[-_]?key|private[-_]?key|access[-_]?key)")
        .expect("sensitive-name pattern is valid")
});

/// Literal secrets written directly into resource attributes.
pub fn attribute_rule() -> Rule {
    Rule {
        short_code: "sensitive-in-attribute",
        legacy_id: Some("GEN003"),
        provider: Provider::General,
        service: "secrets",
        required_kinds: &["resource", "provider", "module"],
        required_labels: &[],
        default_severity: Severity::Critical,
        docs: RuleDocs {
            summary: "Potentially sensitive data stored in block attribute.",
            explanation: "Secrets written as literal attribute values end up in source control and in plain text state. They should come from variables or a secret store.",
            impact: "The stored secret is visible to anyone with repository access",
            resolution: "Reference the secret through a variable or secret management system",
            links: &[
                "https://www.terraform.io/docs/state/sensitive-data.html",
            ],
            good_example: r#"
resource "aws_db_instance" "good_example" {
  password = var.database_password
}
"#,
            bad_example: r#"
resource "aws_db_instance" "bad_example" {
  password = "SuperSecret123"
}
"#,
        },
        check: check_attributes,
    }
}

/// Literal secrets used as variable defaults.
pub fn variable_rule() -> Rule {
    Rule {
        short_code: "sensitive-in-variable",
        legacy_id: Some("GEN001"),
        provider: Provider::General,
        service: "secrets",
        required_kinds: &["variable"],
        required_labels: &[],
        default_severity: Severity::Critical,
        docs: RuleDocs {
            summary: "Potentially sensitive variable has a default value.",
            explanation: "A sensitive-looking variable with a literal default embeds the secret in the module itself rather than taking it from the caller.",
            impact: "The default secret ships with the configuration",
            resolution: "Drop the default and supply the value at plan time",
            links: &[
                "https://www.terraform.io/docs/state/sensitive-data.html",
            ],
            good_example: r#"
variable "db_password" {
  description = "The database admin password."
}
"#,
            bad_example: r#"
variable "db_password" {
  default = "SuperSecret123"
}
"#,
        },
        check: check_variable_default,
    }
}

fn check_attributes(sink: &ResultSink<'_>, block: &Block, _ctx: &Context) {
    scan_attributes(sink, block, block);
}

// Sub-blocks never match this rule's kinds on their own, so recurse here.
fn scan_attributes(sink: &ResultSink<'_>, root: &Block, block: &Block) {
    for attr in block.attributes() {
        let literal = attr.as_str().is_some_and(|s| !s.is_empty());
        if literal && SENSITIVE_NAME.is_match(attr.name()) {
            sink.flag_at(
                attr.range(),
                format!(
                    "Block '{}' includes a potentially sensitive value in attribute '{}'.",
                    root.full_name(),
                    attr.name()
                ),
            );
        }
    }
    for nested in block.nested_blocks() {
        scan_attributes(sink, root, nested);
    }
}

fn check_variable_default(sink: &ResultSink<'_>, block: &Block, _ctx: &Context) {
    let Some(name) = block.labels().first() else {
        return;
    };
    if !SENSITIVE_NAME.is_match(name) {
        return;
    }
    if let Some(default) = block.get_attribute("default") {
        if default.as_str().is_some_and(|s| !s.is_empty()) {
            sink.flag_at(
                default.range(),
                format!(
                    "Variable '{}' includes a potentially sensitive default value.",
                    block.full_name()
                ),
            );
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
        let registry =
            Registry::build(vec![attribute_rule(), variable_rule()]).expect("registry");
        RuleEngine::with_registry(&registry).scan(&blocks, &Context::default())
    }

    #[test]
    fn literal_password_attribute_is_flagged() {
        let set = scan("resource \"aws_db_instance\" \"db\" {\n  password = \"hunter2\"\n}\n");
        let results: Vec<_> = set.of_rule("general-secrets-sensitive-in-attribute").collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].description.contains("aws_db_instance.db"));
        assert!(results[0].description.contains("password"));
    }

    #[test]
    fn variable_reference_is_clean() {
        let set = scan("resource \"aws_db_instance\" \"db\" {\n  password = var.db_password\n}\n");
        assert!(!set.contains("general-secrets-sensitive-in-attribute"));
    }

    #[test]
    fn nested_block_attributes_are_scanned() {
        let set = scan(
            "resource \"helm_release\" \"app\" {\n  set {\n    admin_token = \"abc123\"\n  }\n}\n",
        );
        assert!(set.contains("general-secrets-sensitive-in-attribute"));
    }

    #[test]
    fn provider_blocks_are_scanned() {
        let set = scan("provider \"aws\" {\n  secret_key = \"AKIAFAKEFAKEFAKE\"\n}\n");
        assert!(set.contains("general-secrets-sensitive-in-attribute"));
    }

    #[test]
    fn sensitive_variable_default_is_flagged() {
        let set = scan("variable \"db_password\" {\n  default = \"hunter2\"\n}\n");
        assert!(set.contains("general-secrets-sensitive-in-variable"));
        assert!(set.contains("GEN001"));
    }

    #[test]
    fn sensitive_variable_without_default_is_clean() {
        let set = scan("variable \"db_password\" {\n  description = \"set by the caller\"\n}\n");
        assert!(!set.contains("general-secrets-sensitive-in-variable"));
    }

    #[test]
    fn non_sensitive_variable_default_is_clean() {
        let set = scan("variable \"region\" {\n  default = \"eu-west-1\"\n}\n");
        assert!(!set.contains("general-secrets-sensitive-in-variable"));
    }

    #[test]
    fn empty_literal_is_clean() {
        let set = scan("resource \"aws_db_instance\" \"db\" {\n  password = \"\"\n}\n");
        assert!(!set.contains("general-secrets-sensitive-in-attribute"));
    }
}
