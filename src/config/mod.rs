use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::policy::Policy;

/// Top-level configuration from `.terraguard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# terraguard configuration

[policy]
# Minimum severity to fail the scan (low, medium, high, critical).
fail_on = "low"

# Rule IDs to ignore entirely. Legacy aliases work too.
# ignore_rules = ["aws-s3-enable-bucket-logging"]

# Per-rule severity overrides.
# [policy.overrides]
# "aws-s3-no-public-access-acl" = "medium"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use std::io::Write;

    #[test]
    fn missing_file_yields_default_config() {
        let config = Config::load(Path::new("/nonexistent/.terraguard.toml")).expect("load");
        assert_eq!(config.policy.fail_on, Severity::Low);
        assert!(config.policy.ignore_rules.is_empty());
    }

    #[test]
    fn starter_toml_parses_back() {
        let config: Config = toml::from_str(Config::starter_toml()).expect("starter parses");
        assert_eq!(config.policy.fail_on, Severity::Low);
    }

    #[test]
    fn loads_policy_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            "[policy]\nfail_on = \"high\"\nignore_rules = [\"GEN003\"]\n"
        )
        .expect("write");
        let config = Config::load(file.path()).expect("load");
        assert_eq!(config.policy.fail_on, Severity::High);
        assert!(config.policy.ignore_rules.contains("GEN003"));
    }
}
