//! packmeter compares the encoded size and decompression latency of several
//! representations of one structured payload. It doesn't implement any codec of its own;
//! every representation is produced by an off-the-shelf library, and packmeter only
//! sequences the calls and measures the artifacts.
//!
//! The measured representations are:
//!
//! - Pretty-printed and minified JSON
//! - Schema-based Protobuf, encoded against a `.proto` file compiled at runtime
//! - The minified JSON passed through zstd, reported both as raw bytes and as base64 text
//! - The Protobuf bytes passed through zstd
//! - The minified JSON passed through brotli, reported as base64 text
//!
//! Each representation is a [`Pipeline`]: a payload codec, an optional byte compressor,
//! and an optional text armor stage. The benchmark loop is written once over the
//! registered pipelines, so adding a representation means registering one more pipeline,
//! not touching the loop.
//!
//! ```no_run
//! use packmeter::{bench, standard_pipelines, Payload, Schema};
//!
//! # fn main() -> packmeter::Result<()> {
//! let payload = Payload::load("payload.json")?;
//! let schema = Schema::from_file("schema.proto")?;
//! let report = bench::run(&payload, &standard_pipelines(&schema))?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```
//!
//! Timing is a single sample per representation, with no warm-up and no repetition. That
//! matches the report's advisory purpose; the criterion bench under `benches/` is the
//! statistically robust counterpart.

pub mod bench;
mod codec;
mod compress;
mod error;
mod payload;
mod pipeline;
mod schema;

pub use self::codec::{JsonCodec, PayloadCodec, ProtoCodec};
pub use self::compress::{Brotli, ByteCompressor, Zstd};
pub use self::error::{Error, Result};
pub use self::payload::{Member, Payload, Record};
pub use self::pipeline::{
    standard_pipelines, Armor, Pipeline, BROTLI_JSON_BASE64, JSON_MINIFIED, JSON_PRETTY, PROTOBUF,
    ZSTD_JSON_BASE64, ZSTD_JSON_BYTES, ZSTD_PROTOBUF,
};
pub use self::schema::Schema;

/// The maximum allowed size of any decompressed representation is 64 MiB. Compressed
/// frames promising more than this are rejected before any allocation is made for them.
pub const MAX_DECODE_SIZE: usize = 1usize << 26; // 64 MiB
