//! The benchmark runner: one linear pass over the registered pipelines.
//!
//! Every pipeline is encoded independently and its final byte length recorded; each
//! compressed representation is then decompressed once under a wall-clock timer. Timing
//! is a single sample with no warm-up, no repetition, and no variance reporting, which is
//! all this advisory report claims to be. Any failure aborts the whole pass; a partial
//! table is never produced.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::payload::Payload;
use crate::pipeline::{Pipeline, JSON_MINIFIED};

/// One fully-encoded representation, kept around so the timing pass can reuse it.
pub struct EncodedRepresentation {
    label: &'static str,
    bytes: Vec<u8>,
}

impl EncodedRepresentation {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A representation label paired with its final encoded byte length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SizeMeasurement {
    pub label: &'static str,
    pub bytes: usize,
}

/// A representation label paired with one measured decompression duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingMeasurement {
    pub label: &'static str,
    pub elapsed: Duration,
}

/// Encode the payload through every pipeline, in order. Fail-fast: the first encoding
/// error aborts the pass and nothing is returned.
pub fn encode_all(payload: &Payload, pipelines: &[Pipeline]) -> Result<Vec<EncodedRepresentation>> {
    pipelines
        .iter()
        .map(|pipeline| {
            let bytes = pipeline.encode(payload)?;
            log::debug!("encoded {}: {} bytes", pipeline.label(), bytes.len());
            Ok(EncodedRepresentation {
                label: pipeline.label(),
                bytes,
            })
        })
        .collect()
}

/// Decompress each compressed representation once, recording elapsed wall-clock time.
/// `encoded` must be the output of [`encode_all`] over the same pipeline slice.
pub fn measure_decompression(
    pipelines: &[Pipeline],
    encoded: &[EncodedRepresentation],
) -> Result<Vec<TimingMeasurement>> {
    debug_assert_eq!(pipelines.len(), encoded.len());
    let mut timings = Vec::new();
    for (pipeline, rep) in pipelines.iter().zip(encoded) {
        if !pipeline.is_compressed() {
            continue;
        }
        let start = Instant::now();
        let restored = pipeline.decompress(&rep.bytes)?;
        let elapsed = start.elapsed();
        log::debug!(
            "decompressed {}: {} bytes in {:?}",
            pipeline.label(),
            restored.len(),
            elapsed
        );
        timings.push(TimingMeasurement {
            label: pipeline.label(),
            elapsed,
        });
    }
    Ok(timings)
}

/// Run the full measurement pass: sizes for every representation, then one decompression
/// timing per compressed representation.
pub fn run(payload: &Payload, pipelines: &[Pipeline]) -> Result<Report> {
    let encoded = encode_all(payload, pipelines)?;
    let timings = measure_decompression(pipelines, &encoded)?;
    let sizes = encoded
        .iter()
        .map(|rep| SizeMeasurement {
            label: rep.label,
            bytes: rep.bytes.len(),
        })
        .collect();
    Ok(Report { sizes, timings })
}

/// The finished comparison: a size table plus per-representation timing lines.
#[derive(Clone, Debug)]
pub struct Report {
    sizes: Vec<SizeMeasurement>,
    timings: Vec<TimingMeasurement>,
}

impl Report {
    pub fn sizes(&self) -> &[SizeMeasurement] {
        &self.sizes
    }

    pub fn timings(&self) -> &[TimingMeasurement] {
        &self.timings
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let baseline = self
            .sizes
            .iter()
            .find(|m| m.label == JSON_MINIFIED)
            .map(|m| m.bytes);

        writeln!(f, "{:<22} {:>10} {:>10}", "Representation", "Size (B)", "vs min.")?;
        writeln!(f, "{:-<44}", "")?;
        for m in &self.sizes {
            match baseline {
                Some(base) if base > 0 => {
                    let ratio = m.bytes as f64 / base as f64;
                    writeln!(f, "{:<22} {:>10} {:>9.2}x", m.label, m.bytes, ratio)?;
                }
                _ => writeln!(f, "{:<22} {:>10} {:>10}", m.label, m.bytes, "-")?,
            }
        }

        if !self.timings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Decompression (single sample):")?;
            for t in &self.timings {
                writeln!(f, "{}: {:?}", t.label, t.elapsed)?;
            }
        }
        Ok(())
    }
}
