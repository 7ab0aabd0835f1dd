//! JSON framed with the schema-registry wire header.
//!
//! The header is one magic byte (`0x00`) followed by a big-endian 4-byte
//! schema id. It is stripped from the actual body before the JSON comparison.

use super::{ContentMatcher, InteractionContents};
use crate::body::{Body, ContentType};
use crate::context::MatchingContext;
use crate::error::ContentError;
use crate::json::JsonContentMatcher;
use crate::mismatch::{BodyMatchResult, Mismatch};
use bytes::{BufMut, Bytes, BytesMut};
use serde_json::{Map, Value};
use tracing::debug;

pub const MAGIC_BYTE: u8 = 0x00;

/// Magic byte plus schema id.
pub const WIRE_HEADER_LEN: usize = 5;

/// Strip the wire header. Payloads that are too short or do not start with
/// the magic byte are returned unchanged.
pub fn remove_magic_bytes(bytes: &Bytes) -> Bytes {
    if bytes.len() >= WIRE_HEADER_LEN && bytes[0] == MAGIC_BYTE {
        bytes.slice(WIRE_HEADER_LEN..)
    } else {
        bytes.clone()
    }
}

/// Frame a payload with the wire header for `schema_id`.
pub fn add_magic_bytes(payload: &[u8], schema_id: u32) -> Bytes {
    let mut framed = BytesMut::with_capacity(WIRE_HEADER_LEN + payload.len());
    framed.put_u8(MAGIC_BYTE);
    framed.put_u32(schema_id);
    framed.put_slice(payload);
    framed.freeze()
}

/// Content matcher for `application/vnd.schemaregistry.v1+json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KafkaJsonSchemaContentMatcher;

impl ContentMatcher for KafkaJsonSchemaContentMatcher {
    fn match_body(&self, expected: &Body, actual: &Body, context: &MatchingContext) -> BodyMatchResult {
        debug!("Matching Kafka Json Schema Content");
        let raw = actual.map_bytes(remove_magic_bytes);
        debug!("Raw content = {:?}", raw.value_as_string());

        let invalid_json = raw
            .value()
            .is_some_and(|bytes| !bytes.is_empty() && serde_json::from_slice::<Value>(bytes).is_err());
        if expected.is_present() && invalid_json {
            let received = raw.value_as_string();
            return BodyMatchResult::root_mismatch(
                Mismatch::new("$", format!("Expected json body but received '{received}'"))
                    .with_expected(Value::String(expected.value_as_string()))
                    .with_actual(Value::String(received)),
            );
        }

        JsonContentMatcher.match_body(expected, &raw, context)
    }

    fn setup_body_from_config(&self, config: &Map<String, Value>) -> Result<Vec<InteractionContents>, ContentError> {
        let body = config.get("body").ok_or(ContentError::MissingBody)?;
        let bytes = serde_json::to_vec(body)?;
        Ok(vec![InteractionContents::new(Body::present(
            bytes,
            Some(ContentType::kafka_schema_registry_json()),
        ))])
    }
}
