//! The parts of a pact the accumulator needs to know about.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSummary {
    pub description: String,
    #[serde(default)]
    pub provider_states: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<String>,
}

impl InteractionSummary {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            provider_states: Vec::new(),
            interaction_id: None,
        }
    }

    pub fn with_provider_state(mut self, name: impl Into<String>) -> Self {
        self.provider_states.push(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.interaction_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PactSummary {
    pub consumer: String,
    pub provider: String,
    #[serde(default)]
    pub interactions: Vec<InteractionSummary>,
}

impl PactSummary {
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            interactions: Vec::new(),
        }
    }

    pub fn with_interaction(mut self, interaction: InteractionSummary) -> Self {
        self.interactions.push(interaction);
        self
    }
}

/// Where a pact was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PactSource {
    BrokerUrl(String),
    File(PathBuf),
    #[default]
    Unknown,
}

impl PactSource {
    pub fn description(&self) -> String {
        match self {
            PactSource::BrokerUrl(url) => format!("Pact Broker {url}"),
            PactSource::File(path) => format!("File {}", path.display()),
            PactSource::Unknown => "unknown source".to_string(),
        }
    }
}
