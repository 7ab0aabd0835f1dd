//! Content-type dispatch.
//!
//! A [`ContentMatcher`] compares bodies of one family of content types and
//! builds example bodies from declarative configuration. Built-in matchers
//! cover JSON and schema-registry framed JSON; other content types are
//! delegated to registered [`ContentMatcherPlugin`]s.

mod kafka;
mod plugin;
mod registry;

pub use kafka::{add_magic_bytes, remove_magic_bytes, KafkaJsonSchemaContentMatcher, MAGIC_BYTE, WIRE_HEADER_LEN};
pub use plugin::{ContentMatcherPlugin, PluginConfiguration, PluginContentMatcher, PluginMismatch};
pub use registry::{ContentMatcherRegistry, MatcherSelector};

use crate::body::Body;
use crate::context::MatchingContext;
use crate::error::ContentError;
use crate::generators::Generator;
use crate::mismatch::BodyMatchResult;
use crate::rules::MatchingRuleCategory;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A body produced from configuration, with any rules and generators the
/// matcher derived for it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionContents {
    /// Interaction part the body belongs to; empty for the single part
    pub part_name: String,
    pub body: Body,
    pub rules: Option<MatchingRuleCategory>,
    pub generators: BTreeMap<String, Generator>,
    pub plugin_configuration: Option<PluginConfiguration>,
}

impl InteractionContents {
    pub fn new(body: Body) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }
}

/// Compares bodies of one content-type family.
pub trait ContentMatcher: Send + Sync {
    /// Compare two bodies. Malformed payloads are reported as mismatches.
    fn match_body(&self, expected: &Body, actual: &Body, context: &MatchingContext) -> BodyMatchResult;

    /// Build example bodies from a configuration map holding at least a
    /// `body` key.
    fn setup_body_from_config(&self, config: &Map<String, Value>) -> Result<Vec<InteractionContents>, ContentError>;
}
