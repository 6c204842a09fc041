//! Built-in rule set.

mod gcp_bucket_acl;
mod iam_policy_wildcards;
mod s3_bucket_encryption;
mod s3_bucket_logging;
mod s3_public_acl;
mod secrets;
mod vpc_public_ingress;

use super::Rule;

/// All built-in rules, composed explicitly. The registry sorts and checks
/// identities; order here carries no meaning.
pub fn all_rules() -> Vec<Rule> {
    vec![
        s3_bucket_logging::rule(),
        s3_public_acl::rule(),
        s3_bucket_encryption::rule(),
        vpc_public_ingress::rule(),
        iam_policy_wildcards::rule(),
        gcp_bucket_acl::rule(),
        secrets::attribute_rule(),
        secrets::variable_rule(),
    ]
}
