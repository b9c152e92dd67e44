//! General-purpose byte compressors used by the compressed representations.
//!
//! Two compressors are provided: [`Zstd`], the dictionary compressor, which may carry an
//! optional caller-supplied dictionary, and [`Brotli`], the general-purpose text
//! compressor. Both sit behind the [`ByteCompressor`] trait so a pipeline can treat the
//! compression stage as a pluggable strategy.
//!
//! Decompression is bounded by [`MAX_DECODE_SIZE`]: a zstd frame must declare its content
//! size up front and is rejected before allocation if it promises too much, while brotli
//! output is capped while streaming.

use std::{cell::RefCell, fmt, io::Read};

use crate::error::{Error, Result};
use crate::MAX_DECODE_SIZE;

thread_local! {
    static ZSTD_CCTX: RefCell<zstd_safe::CCtx<'static>> = RefCell::new(zstd_safe::CCtx::create());
    static ZSTD_DCTX: RefCell<zstd_safe::DCtx<'static>> = RefCell::new(zstd_safe::DCtx::create());
}

/// A lossless byte compressor paired with its inverse.
pub trait ByteCompressor {
    /// Short name used in representation labels.
    fn name(&self) -> &'static str;
    /// Compress `src` into a fresh buffer. Fails with [`Error::Encode`] if the underlying
    /// library rejects the input.
    fn compress(&self, src: &[u8]) -> Result<Vec<u8>>;
    /// Invert [`ByteCompressor::compress`]. Fails with [`Error::Decode`] on corrupt input,
    /// or [`Error::DecodeTooLarge`] if the output would exceed [`MAX_DECODE_SIZE`].
    fn decompress(&self, src: &[u8]) -> Result<Vec<u8>>;
}

fn zstd_error(code: zstd_safe::ErrorCode) -> String {
    // SAFETY: We assume the zstd library will always return a valid static C string from
    // this function, as it promises to do.
    let e_str = unsafe { core::ffi::CStr::from_ptr(zstd_safe::zstd_sys::ZSTD_getErrorName(code)) };
    let e_str = e_str.to_str().unwrap_or("Undisplayable error code");
    format!("zstd failure, code {} ({})", code, e_str)
}

/// A ZStandard compression dictionary, usable for both directions.
pub struct Dictionary {
    level: i32,
    cdict: zstd_safe::CDict<'static>,
    ddict: zstd_safe::DDict<'static>,
}

impl Dictionary {
    /// Create a dictionary from raw dictionary content. Returns `None` if zstd rejects it.
    pub fn new(level: i32, dict: &[u8]) -> Option<Self> {
        let cdict = zstd_safe::CDict::try_create(dict, level)?;
        let ddict = zstd_safe::DDict::try_create(dict)?;
        Some(Dictionary {
            level,
            cdict,
            ddict,
        })
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("level", &self.level)
            .finish()
    }
}

/// The dictionary compressor: ZStandard, optionally with a shared dictionary.
#[derive(Debug)]
pub struct Zstd {
    level: i32,
    dict: Option<Dictionary>,
}

impl Zstd {
    pub fn new(level: i32) -> Self {
        Zstd { level, dict: None }
    }

    /// Compress with a caller-supplied dictionary. Returns `None` if the dictionary bytes
    /// are rejected by zstd.
    pub fn with_dictionary(level: i32, dict: &[u8]) -> Option<Self> {
        Some(Zstd {
            level,
            dict: Some(Dictionary::new(level, dict)?),
        })
    }
}

impl Default for Zstd {
    fn default() -> Self {
        Zstd::new(3)
    }
}

impl ByteCompressor for Zstd {
    fn name(&self) -> &'static str {
        "Zstd"
    }

    fn compress(&self, src: &[u8]) -> Result<Vec<u8>> {
        use zstd_safe::{CParameter, ResetDirective};
        ZSTD_CCTX.with_borrow_mut(|ctx| {
            ctx.reset(ResetDirective::SessionAndParameters)
                .map_err(|e| Error::Encode(zstd_error(e)))?;
            if let Some(dict) = &self.dict {
                ctx.ref_cdict(&dict.cdict)
                    .map_err(|e| Error::Encode(zstd_error(e)))?;
            } else {
                ctx.set_parameter(CParameter::CompressionLevel(self.level))
                    .map_err(|e| Error::Encode(zstd_error(e)))?;
            }
            ctx.set_parameter(CParameter::ContentSizeFlag(true))
                .map_err(|e| Error::Encode(zstd_error(e)))?;

            let mut dst = vec![0u8; zstd_safe::compress_bound(src.len())];
            let used = ctx
                .compress2(&mut dst[..], src)
                .map_err(|e| Error::Encode(zstd_error(e)))?;
            dst.truncate(used);
            Ok(dst)
        })
    }

    fn decompress(&self, src: &[u8]) -> Result<Vec<u8>> {
        use zstd_safe::{DParameter, ResetDirective};

        // The frame must promise its decompressed size, and the promise must fit under the
        // ceiling, before any output space is reserved.
        let expected = zstd_safe::get_frame_content_size(src)
            .map_err(|_| Error::Decode("corrupt zstd frame header".into()))?
            .ok_or_else(|| Error::Decode("zstd frame is missing its content size".into()))?;
        if expected > MAX_DECODE_SIZE as u64 {
            return Err(Error::DecodeTooLarge {
                max: MAX_DECODE_SIZE,
                actual: expected as usize,
            });
        }
        let expected = expected as usize;

        ZSTD_DCTX.with_borrow_mut(|dtx| {
            dtx.reset(ResetDirective::SessionAndParameters)
                .map_err(|e| Error::Decode(zstd_error(e)))?;
            if let Some(dict) = &self.dict {
                dtx.ref_ddict(&dict.ddict)
                    .map_err(|e| Error::Decode(zstd_error(e)))?;
            }
            dtx.set_parameter(DParameter::WindowLogMax(27))
                .map_err(|e| Error::Decode(zstd_error(e)))?;

            let mut dst = vec![0u8; expected];
            let used = dtx
                .decompress(&mut dst[..], src)
                .map_err(|e| Error::Decode(zstd_error(e)))?;
            if used != expected {
                return Err(Error::Decode(
                    "decompressed size doesn't match promised size".into(),
                ));
            }
            Ok(dst)
        })
    }
}

/// The general-purpose compressor: brotli at its default quality, matching what the text
/// representations are typically run through elsewhere.
#[derive(Debug)]
pub struct Brotli {
    quality: i32,
    lgwin: i32,
}

impl Brotli {
    pub fn new(quality: i32, lgwin: i32) -> Self {
        Brotli { quality, lgwin }
    }
}

impl Default for Brotli {
    fn default() -> Self {
        Brotli::new(11, 22)
    }
}

impl ByteCompressor for Brotli {
    fn name(&self) -> &'static str {
        "Brotli"
    }

    fn compress(&self, src: &[u8]) -> Result<Vec<u8>> {
        let params = brotli::enc::BrotliEncoderParams {
            quality: self.quality,
            lgwin: self.lgwin,
            ..Default::default()
        };
        let mut dst = Vec::new();
        brotli::BrotliCompress(&mut &src[..], &mut dst, &params)
            .map_err(|e| Error::Encode(format!("brotli failure: {}", e)))?;
        Ok(dst)
    }

    fn decompress(&self, src: &[u8]) -> Result<Vec<u8>> {
        // Brotli streams don't declare their decompressed size, so cap while reading.
        let mut dst = Vec::new();
        let decoder = brotli::Decompressor::new(src, 8 * 1024);
        decoder
            .take(MAX_DECODE_SIZE as u64 + 1)
            .read_to_end(&mut dst)
            .map_err(|e| Error::Decode(format!("brotli failure: {}", e)))?;
        if dst.len() > MAX_DECODE_SIZE {
            return Err(Error::DecodeTooLarge {
                max: MAX_DECODE_SIZE,
                actual: dst.len(),
            });
        }
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repetitive_fixture() -> Vec<u8> {
        let mut data = Vec::new();
        for i in 0..200 {
            data.extend_from_slice(
                format!(
                    r#"{{"name":"user-{}","active":true,"tags":["alpha","beta"]}}"#,
                    i % 10
                )
                .as_bytes(),
            );
        }
        data
    }

    #[test]
    fn zstd_round_trip() {
        let data = repetitive_fixture();
        let zstd = Zstd::default();
        let compressed = zstd.compress(&data).unwrap();
        assert_eq!(zstd.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn zstd_round_trip_empty() {
        let zstd = Zstd::default();
        let compressed = zstd.compress(&[]).unwrap();
        assert_eq!(zstd.decompress(&compressed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn zstd_dictionary_round_trip() {
        let data = repetitive_fixture();
        let zstd = Zstd::with_dictionary(3, &data[..512]).unwrap();
        let compressed = zstd.compress(&data).unwrap();
        assert_eq!(zstd.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn zstd_shrinks_repetitive_input() {
        let data = repetitive_fixture();
        let compressed = Zstd::default().compress(&data).unwrap();
        assert!(compressed.len() < data.len());
    }

    #[test]
    fn zstd_rejects_corrupt_frame() {
        assert!(Zstd::default().decompress(b"not a zstd frame").is_err());
    }

    #[test]
    fn zstd_rejects_oversize_promise() {
        // Handcrafted frame header: magic, then a descriptor declaring a single-segment
        // frame with an 8-byte content size field promising far more than the ceiling.
        let mut frame = vec![0x28, 0xB5, 0x2F, 0xFD, 0xE0];
        frame.extend_from_slice(&(1u64 << 40).to_le_bytes());
        match Zstd::default().decompress(&frame) {
            Err(Error::DecodeTooLarge { .. }) => (),
            other => panic!("expected DecodeTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn brotli_round_trip() {
        let data = repetitive_fixture();
        let brotli = Brotli::default();
        let compressed = brotli.compress(&data).unwrap();
        assert_eq!(brotli.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn brotli_shrinks_repetitive_input() {
        let data = repetitive_fixture();
        let compressed = Brotli::default().compress(&data).unwrap();
        assert!(compressed.len() < data.len());
    }

    #[test]
    fn brotli_rejects_truncated_stream() {
        let data = repetitive_fixture();
        let brotli = Brotli::default();
        let compressed = brotli.compress(&data).unwrap();
        assert!(brotli
            .decompress(&compressed[..compressed.len() / 2])
            .is_err());
    }
}
