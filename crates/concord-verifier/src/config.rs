//! Verifier configuration.
//!
//! Loaded from YAML, then optionally overridden from the environment:
//!
//! ```yaml
//! provider:
//!   version: 1.4.2
//!   tags: main, prod
//!   branch: main
//! publish_results: true
//! matching:
//!   allow_unexpected_keys: true
//!   spec_version: V4
//! ```

use concord_matching::SpecVersion;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::warn;

pub const ENV_PUBLISH_RESULTS: &str = "PACT_VERIFIER_PUBLISH_RESULTS";
pub const ENV_PROVIDER_VERSION: &str = "PACT_PROVIDER_VERSION";
pub const ENV_PROVIDER_TAG: &str = "PACT_PROVIDER_TAG";
pub const ENV_PROVIDER_BRANCH: &str = "PACT_PROVIDER_BRANCH";

const DEFAULT_PROVIDER_VERSION: &str = "0.0.0";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VerifierConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Publish results once every interaction of a pact has been verified
    #[serde(default)]
    pub publish_results: bool,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_version")]
    pub version: String,
    /// Written as a comma-separated string or a list
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            version: default_provider_version(),
            tags: Vec::new(),
            branch: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchingConfig {
    #[serde(default = "default_allow_unexpected_keys")]
    pub allow_unexpected_keys: bool,
    #[serde(default)]
    pub spec_version: SpecVersion,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            allow_unexpected_keys: default_allow_unexpected_keys(),
            spec_version: SpecVersion::default(),
        }
    }
}

fn default_provider_version() -> String {
    DEFAULT_PROVIDER_VERSION.to_string()
}

fn default_allow_unexpected_keys() -> bool {
    true
}

fn split_tags(tags: &str) -> Vec<String> {
    if tags.trim().is_empty() {
        return Vec::new();
    }
    tags.split(',').map(|tag| tag.trim().to_string()).collect()
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match Tags::deserialize(deserializer)? {
        Tags::Joined(joined) => split_tags(&joined),
        Tags::List(list) => list.into_iter().map(|tag| tag.trim().to_string()).collect(),
    })
}

impl VerifierConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: VerifierConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.provider.tags.iter().any(String::is_empty) {
            anyhow::bail!(
                "Provider tags must not be empty: {:?}. Separate tags with single commas",
                self.provider.tags
            );
        }

        let version = &self.provider.version;
        if version.chars().any(|c| c.is_whitespace() || c.is_control()) {
            anyhow::bail!("Malformed provider version '{version}': versions must not contain whitespace");
        }

        if let Some(branch) = &self.provider.branch {
            if branch.trim().is_empty() {
                anyhow::bail!("Provider branch must not be blank when set");
            }
        }

        Ok(())
    }

    /// Apply `PACT_*` environment overrides, then re-validate.
    pub fn apply_env(&mut self) -> Result<(), anyhow::Error> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), anyhow::Error> {
        if let Some(publish) = lookup(ENV_PUBLISH_RESULTS) {
            self.publish_results = match publish.trim().to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                other => anyhow::bail!("{ENV_PUBLISH_RESULTS} must be 'true' or 'false', got '{other}'"),
            };
        }
        if let Some(version) = lookup(ENV_PROVIDER_VERSION) {
            self.provider.version = version.trim().to_string();
        }
        if let Some(tags) = lookup(ENV_PROVIDER_TAG) {
            self.provider.tags = split_tags(&tags);
        }
        if let Some(branch) = lookup(ENV_PROVIDER_BRANCH) {
            self.provider.branch = Some(branch.trim().to_string()).filter(|b| !b.is_empty());
        }
        self.validate()
    }

    /// The provider version to publish with. Empty versions fall back to
    /// `0.0.0`.
    pub fn provider_version(&self) -> String {
        if self.provider.version.is_empty() {
            warn!(
                "Set the provider version using {} or 'provider.version'. Defaulting to '{}'",
                ENV_PROVIDER_VERSION, DEFAULT_PROVIDER_VERSION
            );
            return DEFAULT_PROVIDER_VERSION.to_string();
        }
        self.provider.version.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config: VerifierConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.provider.version, "0.0.0");
        assert!(config.provider.tags.is_empty());
        assert!(!config.publish_results);
        assert!(config.matching.allow_unexpected_keys);
        assert_eq!(config.matching.spec_version, SpecVersion::V4);
    }

    #[test]
    fn test_from_file() {
        let file = write_config(
            r#"
provider:
  version: 1.4.2
  tags: main, prod
  branch: main
publish_results: true
matching:
  allow_unexpected_keys: false
  spec_version: V3
"#,
        );
        let config = VerifierConfig::from_file(file.path()).unwrap();
        assert_eq!(config.provider.version, "1.4.2");
        assert_eq!(config.provider.tags, vec!["main", "prod"]);
        assert_eq!(config.provider.branch.as_deref(), Some("main"));
        assert!(config.publish_results);
        assert!(!config.matching.allow_unexpected_keys);
        assert_eq!(config.matching.spec_version, SpecVersion::V3);
    }

    #[test]
    fn test_tags_as_list() {
        let config: VerifierConfig = serde_yaml::from_str("provider:\n  tags: [a, ' b ']\n").unwrap();
        assert_eq!(config.provider.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_validation_errors() {
        let file = write_config("provider:\n  tags: 'main,,prod'\n");
        let err = VerifierConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Provider tags must not be empty"));

        let file = write_config("provider:\n  version: '1.0 beta'\n");
        let err = VerifierConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Malformed provider version"));

        let file = write_config("matching:\n  spec_version: V9\n");
        assert!(VerifierConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_PUBLISH_RESULTS, "TRUE"),
            (ENV_PROVIDER_VERSION, " 2.0.0 "),
            (ENV_PROVIDER_TAG, "dev,qa"),
            (ENV_PROVIDER_BRANCH, "feature/x"),
        ]);
        let mut config = VerifierConfig::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert!(config.publish_results);
        assert_eq!(config.provider.version, "2.0.0");
        assert_eq!(config.provider.tags, vec!["dev", "qa"]);
        assert_eq!(config.provider.branch.as_deref(), Some("feature/x"));

        let err = config
            .apply_overrides(|name| (name == ENV_PUBLISH_RESULTS).then(|| "yes".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("must be 'true' or 'false'"));
    }

    #[test]
    fn test_empty_version_falls_back() {
        let mut config = VerifierConfig::default();
        config.provider.version = String::new();
        assert_eq!(config.provider_version(), "0.0.0");
    }
}
