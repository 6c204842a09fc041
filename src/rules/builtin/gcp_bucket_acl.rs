use crate::context::Context;
use crate::hcl::Block;
use crate::rules::{Provider, ResultSink, Rule, RuleDocs, Severity};

const PUBLIC_ENTITIES: &[&str] = &["allUsers", "allAuthenticatedUsers"];

/// GCS bucket ACLs granting access to all users.
pub fn rule() -> Rule {
    Rule {
        short_code: "no-public-access",
        legacy_id: Some("GCP002"),
        provider: Provider::Google,
        service: "storage",
        required_kinds: &["resource"],
        required_labels: &[&["google_storage_bucket_acl"]],
        default_severity: Severity::Critical,
        docs: RuleDocs {
            summary: "Storage bucket ACL grants access to all users.",
            explanation: "A role_entity granting allUsers or allAuthenticatedUsers opens the bucket to everyone with a Google account, or to the whole internet.",
            impact: "Anyone can read the contents of the storage bucket",
            resolution: "Restrict the role_entity grants to named users and groups",
            links: &[
                "https://cloud.google.com/storage/docs/access-control/lists",
                "https://registry.terraform.io/providers/hashicorp/google/latest/docs/resources/storage_bucket_acl",
            ],
            good_example: r#"
resource "google_storage_bucket_acl" "good_example" {
  bucket      = "static-content-bucket"
  role_entity = [
    "OWNER:user-admin@example.com",
    "READER:group-engineers@example.com",
  ]
}
"#,
            bad_example: r#"
resource "google_storage_bucket_acl" "bad_example" {
  bucket      = "static-content-bucket"
  role_entity = [
    "READER:allUsers",
  ]
}
"#,
        },
        check,
    }
}

fn check(sink: &ResultSink<'_>, block: &Block, _ctx: &Context) {
    let Some(role_entity) = block.get_attribute("role_entity") else {
        return;
    };
    for grant in role_entity.string_items() {
        // role_entity entries are "ROLE:entity".
        let entity = grant.split(':').nth(1).unwrap_or(grant);
        if PUBLIC_ENTITIES.contains(&entity) {
            sink.flag(
                block,
                format!(
                    "Resource '{}' grants '{}' access to all users.",
                    block.full_name(),
                    grant
                ),
            );
        }
    }
}
