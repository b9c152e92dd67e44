//! Representation pipelines.
//!
//! A [`Pipeline`] chains a payload codec, an optional compression stage, and an optional
//! text armor stage into one named representation. [`standard_pipelines`] registers the
//! full set the report compares; the benchmark loop itself never needs to know which
//! libraries sit behind a row.

use base64::Engine;

use crate::codec::{JsonCodec, PayloadCodec, ProtoCodec};
use crate::compress::{Brotli, ByteCompressor, Zstd};
use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::schema::Schema;

pub const JSON_PRETTY: &str = "JSON (pretty)";
pub const JSON_MINIFIED: &str = "JSON (minified)";
pub const ZSTD_JSON_BASE64: &str = "Zstd JSON (base64)";
pub const ZSTD_JSON_BYTES: &str = "Zstd JSON (bytes)";
pub const PROTOBUF: &str = "Protobuf";
pub const ZSTD_PROTOBUF: &str = "Zstd Protobuf";
pub const BROTLI_JSON_BASE64: &str = "Brotli JSON (base64)";

/// Final re-encoding of compressed bytes into printable text, where a representation
/// calls for one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Armor {
    None,
    Base64,
}

impl Armor {
    fn apply(&self, bytes: Vec<u8>) -> Vec<u8> {
        match self {
            Armor::None => bytes,
            Armor::Base64 => base64::engine::general_purpose::STANDARD
                .encode(bytes)
                .into_bytes(),
        }
    }

    fn strip(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        match self {
            Armor::None => Ok(bytes.to_vec()),
            Armor::Base64 => base64::engine::general_purpose::STANDARD
                .decode(bytes)
                .map_err(|e| Error::Decode(format!("bad base64 armor: {}", e))),
        }
    }
}

/// One named representation of the payload.
pub struct Pipeline {
    label: &'static str,
    codec: Box<dyn PayloadCodec>,
    compressor: Option<Box<dyn ByteCompressor>>,
    armor: Armor,
}

impl Pipeline {
    pub fn new(label: &'static str, codec: impl PayloadCodec + 'static) -> Self {
        Pipeline {
            label,
            codec: Box::new(codec),
            compressor: None,
            armor: Armor::None,
        }
    }

    pub fn with_compressor(mut self, compressor: impl ByteCompressor + 'static) -> Self {
        self.compressor = Some(Box::new(compressor));
        self
    }

    pub fn with_armor(mut self, armor: Armor) -> Self {
        self.armor = armor;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether this representation has a compression stage, and therefore a decompression
    /// latency worth measuring.
    pub fn is_compressed(&self) -> bool {
        self.compressor.is_some()
    }

    /// Produce the final, fully-encoded bytes of this representation.
    pub fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
        let mut bytes = self.codec.encode(payload)?;
        if let Some(compressor) = &self.compressor {
            bytes = compressor.compress(&bytes)?;
        }
        Ok(self.armor.apply(bytes))
    }

    /// Invert the armor and compression stages only, yielding the codec-level bytes.
    /// Fails on representations without a compression stage.
    pub fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let compressor = self.compressor.as_ref().ok_or_else(|| {
            Error::Decode(format!("{} is not a compressed representation", self.label))
        })?;
        let stripped = self.armor.strip(bytes)?;
        compressor.decompress(&stripped)
    }

    /// Fully invert [`Pipeline::encode`] back to a payload.
    pub fn decode(&self, bytes: &[u8]) -> Result<Payload> {
        let inner = match &self.compressor {
            Some(_) => self.decompress(bytes)?,
            None => self.armor.strip(bytes)?,
        };
        self.codec.decode(&inner)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("label", &self.label)
            .field("codec", &self.codec.name())
            .field("compressed", &self.is_compressed())
            .field("armor", &self.armor)
            .finish()
    }
}

/// The full set of compared representations, in report order.
pub fn standard_pipelines(schema: &Schema) -> Vec<Pipeline> {
    vec![
        Pipeline::new(JSON_PRETTY, JsonCodec::pretty()),
        Pipeline::new(JSON_MINIFIED, JsonCodec::minified()),
        Pipeline::new(ZSTD_JSON_BASE64, JsonCodec::minified())
            .with_compressor(Zstd::default())
            .with_armor(Armor::Base64),
        Pipeline::new(ZSTD_JSON_BYTES, JsonCodec::minified()).with_compressor(Zstd::default()),
        Pipeline::new(PROTOBUF, ProtoCodec::new(schema.clone())),
        Pipeline::new(ZSTD_PROTOBUF, ProtoCodec::new(schema.clone()))
            .with_compressor(Zstd::default()),
        Pipeline::new(BROTLI_JSON_BASE64, JsonCodec::minified())
            .with_compressor(Brotli::default())
            .with_armor(Armor::Base64),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{Member, Record};

    fn sample_payload() -> Payload {
        let records = (0..25)
            .map(|i| Record {
                name: format!("record-{}", i),
                active: i % 2 == 0,
                tags: vec!["inventory".into(), "replicated".into()],
                members: vec![Member {
                    id: format!("member-{}", i % 5),
                    roles: vec!["reader".into(), "owner".into()],
                }],
            })
            .collect();
        Payload::from_records(records)
    }

    fn test_schema() -> Schema {
        Schema::from_file("testdata/schema.proto").unwrap()
    }

    #[test]
    fn standard_set_has_expected_rows() {
        let pipelines = standard_pipelines(&test_schema());
        let labels: Vec<_> = pipelines.iter().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            vec![
                JSON_PRETTY,
                JSON_MINIFIED,
                ZSTD_JSON_BASE64,
                ZSTD_JSON_BYTES,
                PROTOBUF,
                ZSTD_PROTOBUF,
                BROTLI_JSON_BASE64,
            ]
        );
        assert_eq!(pipelines.iter().filter(|p| p.is_compressed()).count(), 4);
    }

    #[test]
    fn every_pipeline_round_trips() {
        let payload = sample_payload();
        for pipeline in standard_pipelines(&test_schema()) {
            let bytes = pipeline.encode(&payload).unwrap();
            assert_eq!(
                pipeline.decode(&bytes).unwrap(),
                payload,
                "round trip failed for {}",
                pipeline.label()
            );
        }
    }

    #[test]
    fn every_pipeline_round_trips_empty_payload() {
        let payload = Payload::default();
        for pipeline in standard_pipelines(&test_schema()) {
            let bytes = pipeline.encode(&payload).unwrap();
            assert_eq!(
                pipeline.decode(&bytes).unwrap(),
                payload,
                "empty round trip failed for {}",
                pipeline.label()
            );
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let payload = sample_payload();
        for pipeline in standard_pipelines(&test_schema()) {
            assert_eq!(
                pipeline.encode(&payload).unwrap(),
                pipeline.encode(&payload).unwrap(),
                "encoding not deterministic for {}",
                pipeline.label()
            );
        }
    }

    #[test]
    fn compressed_rows_beat_minified_json() {
        let payload = sample_payload();
        let schema = test_schema();
        let minified = Pipeline::new(JSON_MINIFIED, JsonCodec::minified())
            .encode(&payload)
            .unwrap();
        for pipeline in standard_pipelines(&schema) {
            if pipeline.label() == ZSTD_JSON_BYTES || pipeline.label() == ZSTD_PROTOBUF {
                let bytes = pipeline.encode(&payload).unwrap();
                assert!(
                    bytes.len() < minified.len(),
                    "{} produced {} bytes, input was {}",
                    pipeline.label(),
                    bytes.len(),
                    minified.len()
                );
            }
        }
    }

    #[test]
    fn decompress_stage_yields_codec_bytes_exactly() {
        let payload = sample_payload();
        let schema = test_schema();
        let proto = ProtoCodec::new(schema.clone());
        let raw = proto.encode(&payload).unwrap();
        let pipeline =
            Pipeline::new(ZSTD_PROTOBUF, ProtoCodec::new(schema)).with_compressor(Zstd::default());
        let compressed = pipeline.encode(&payload).unwrap();
        assert_eq!(pipeline.decompress(&compressed).unwrap(), raw);
    }

    #[test]
    fn base64_armor_grows_output() {
        let payload = sample_payload();
        let armored = Pipeline::new(ZSTD_JSON_BASE64, JsonCodec::minified())
            .with_compressor(Zstd::default())
            .with_armor(Armor::Base64)
            .encode(&payload)
            .unwrap();
        let raw = Pipeline::new(ZSTD_JSON_BYTES, JsonCodec::minified())
            .with_compressor(Zstd::default())
            .encode(&payload)
            .unwrap();
        assert!(armored.len() > raw.len());
    }

    #[test]
    fn decompress_on_uncompressed_row_is_an_error() {
        let pipeline = Pipeline::new(JSON_MINIFIED, JsonCodec::minified());
        assert!(pipeline.decompress(b"[]").is_err());
    }

    #[test]
    fn corrupt_armor_is_decode_error() {
        let pipeline = Pipeline::new(ZSTD_JSON_BASE64, JsonCodec::minified())
            .with_compressor(Zstd::default())
            .with_armor(Armor::Base64);
        let err = pipeline.decode(b"@@not-base64@@").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
