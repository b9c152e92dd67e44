//! Payload codecs: the serialization stage of a representation.
//!
//! A [`PayloadCodec`] turns the in-memory payload into bytes and back. The JSON codec
//! covers both text representations; the Protobuf codec encodes against the runtime
//! loaded [`Schema`] through a dynamic message, so no generated code is involved.

use prost::Message;
use prost_reflect::DynamicMessage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::payload::{Payload, Record};
use crate::schema::Schema;

/// Serialization strategy for one representation family.
pub trait PayloadCodec {
    /// Short name used in logs.
    fn name(&self) -> &'static str;
    fn encode(&self, payload: &Payload) -> Result<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> Result<Payload>;
}

/// JSON text codec, in pretty or minified form.
#[derive(Clone, Copy, Debug)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn pretty() -> Self {
        JsonCodec { pretty: true }
    }

    pub fn minified() -> Self {
        JsonCodec { pretty: false }
    }
}

impl PayloadCodec for JsonCodec {
    fn name(&self) -> &'static str {
        if self.pretty {
            "json-pretty"
        } else {
            "json"
        }
    }

    fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
        let out = if self.pretty {
            serde_json::to_vec_pretty(payload)
        } else {
            serde_json::to_vec(payload)
        };
        out.map_err(|e| Error::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Payload> {
        serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))
    }
}

// The schema's top-level message carries the record list in a `records` field; these
// wrappers bridge between that shape and the bare-array Payload.
#[derive(Serialize)]
struct RecordSetRef<'a> {
    records: &'a [Record],
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RecordSetOwned {
    records: Vec<Record>,
}

/// Schema-based binary codec: the payload as a dynamic Protobuf message.
#[derive(Clone, Debug)]
pub struct ProtoCodec {
    schema: Schema,
}

impl ProtoCodec {
    pub fn new(schema: Schema) -> Self {
        ProtoCodec { schema }
    }
}

impl PayloadCodec for ProtoCodec {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
        let wire = serde_json::to_value(RecordSetRef {
            records: payload.records(),
        })
        .map_err(|e| Error::Encode(e.to_string()))?;
        let msg = DynamicMessage::deserialize(self.schema.message().clone(), wire)
            .map_err(|e| Error::Encode(format!("payload does not conform to schema: {}", e)))?;
        Ok(msg.encode_to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Payload> {
        let msg = DynamicMessage::decode(self.schema.message().clone(), bytes)
            .map_err(|e| Error::Decode(format!("binary doesn't match schema: {}", e)))?;
        let value = serde_json::to_value(&msg).map_err(|e| Error::Decode(e.to_string()))?;
        let wire: RecordSetOwned =
            serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))?;
        Ok(Payload::from_records(wire.records))
    }
}
