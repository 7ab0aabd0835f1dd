//! Payload bodies and their declared content types.
//!
//! A body has tri-state presence: it may be missing (never specified), empty,
//! an explicit null, or present with bytes. Null is a valid content value and
//! is distinct from empty.

use crate::error::ContentError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Media type for plain JSON bodies.
pub const JSON: &str = "application/json";

/// Media type for JSON framed with the schema-registry wire header.
pub const KAFKA_SCHEMA_REGISTRY_JSON: &str = "application/vnd.schemaregistry.v1+json";

/// Presence state and bytes of a body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodyContents {
    /// The body was never specified
    #[default]
    Missing,
    /// The body was specified with no content
    Empty,
    /// The body is an explicit null value
    Null,
    /// The body has content
    Present(Bytes),
}

/// A request, response or message payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
    pub contents: BodyContents,
    pub content_type: Option<ContentType>,
}

impl Body {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            contents: BodyContents::Empty,
            content_type: None,
        }
    }

    pub fn null() -> Self {
        Self {
            contents: BodyContents::Null,
            content_type: None,
        }
    }

    /// Create a body with content. Zero bytes are treated as an empty body.
    pub fn present(bytes: impl Into<Bytes>, content_type: Option<ContentType>) -> Self {
        let bytes = bytes.into();
        let contents = if bytes.is_empty() {
            BodyContents::Empty
        } else {
            BodyContents::Present(bytes)
        };
        Self {
            contents,
            content_type,
        }
    }

    /// Create a JSON body from a parsed value.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::present(value.to_string(), Some(ContentType::json()))
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.contents, BodyContents::Missing)
    }

    pub fn is_empty(&self) -> bool {
        match &self.contents {
            BodyContents::Empty => true,
            BodyContents::Present(bytes) => bytes.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, BodyContents::Null)
    }

    pub fn is_present(&self) -> bool {
        matches!(&self.contents, BodyContents::Present(bytes) if !bytes.is_empty())
    }

    /// The body bytes, if any were supplied.
    pub fn value(&self) -> Option<&[u8]> {
        match &self.contents {
            BodyContents::Present(bytes) => Some(bytes.as_ref()),
            BodyContents::Empty => Some(&[]),
            BodyContents::Missing | BodyContents::Null => None,
        }
    }

    /// The body rendered as (lossy) UTF-8. Missing and null bodies render empty.
    pub fn value_as_string(&self) -> String {
        self.value()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }

    /// Replace the bytes while keeping the presence state and content type.
    pub fn map_bytes(&self, f: impl FnOnce(&Bytes) -> Bytes) -> Self {
        match &self.contents {
            BodyContents::Present(bytes) => Self::present(f(bytes), self.content_type.clone()),
            _ => self.clone(),
        }
    }

    /// Parse the body as JSON. An explicit null body parses to `Value::Null`.
    pub fn parse_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match &self.contents {
            BodyContents::Null => Ok(serde_json::Value::Null),
            BodyContents::Present(bytes) => serde_json::from_slice(bytes),
            BodyContents::Missing | BodyContents::Empty => serde_json::from_slice(&[]),
        }
    }
}

/// A parsed media type such as `application/vnd.schemaregistry.v1+json; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentType {
    pub main_type: String,
    pub sub_type: String,
    pub attributes: BTreeMap<String, String>,
}

impl ContentType {
    pub fn json() -> Self {
        Self::new("application", "json")
    }

    pub fn kafka_schema_registry_json() -> Self {
        Self::new("application", "vnd.schemaregistry.v1+json")
    }

    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into().to_lowercase(),
            sub_type: sub_type.into().to_lowercase(),
            attributes: BTreeMap::new(),
        }
    }

    /// `type/subtype` without attributes.
    pub fn base_type(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Structured syntax suffix, e.g. `json` for `vnd.api+json`.
    pub fn suffix(&self) -> Option<&str> {
        self.sub_type.split_once('+').map(|(_, suffix)| suffix)
    }

    pub fn is_json(&self) -> bool {
        self.sub_type == "json" || self.suffix() == Some("json")
    }

    pub fn is_kafka_schema_registry_json(&self) -> bool {
        self.base_type() == KAFKA_SCHEMA_REGISTRY_JSON
    }

    pub fn is_text(&self) -> bool {
        self.main_type == "text"
    }

    /// Two content types describe the same kind of payload.
    pub fn is_equivalent(&self, other: &ContentType) -> bool {
        self.base_type() == other.base_type() || (self.is_json() && other.is_json())
    }
}

impl FromStr for ContentType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        let (main_type, sub_type) = essence
            .split_once('/')
            .filter(|(main, sub)| !main.is_empty() && !sub.is_empty())
            .ok_or_else(|| ContentError::InvalidContentType(s.to_string()))?;

        let mut content_type = ContentType::new(main_type.trim(), sub_type.trim());
        for attribute in parts {
            if let Some((key, value)) = attribute.split_once('=') {
                content_type.attributes.insert(
                    key.trim().to_lowercase(),
                    value.trim().trim_matches('"').to_string(),
                );
            }
        }
        Ok(content_type)
    }
}

impl TryFrom<String> for ContentType {
    type Error = ContentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;
        for (key, value) in &self.attributes {
            write!(f, "; {key}={value}")?;
        }
        Ok(())
    }
}
