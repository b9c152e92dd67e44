use std::fmt;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Occurs when the schema file is missing, unreadable, or malformed, or when the compiled
    /// schema doesn't contain the expected top-level message.
    SchemaLoad { path: PathBuf, reason: String },
    /// Occurs when the payload input file is missing, unreadable, or isn't valid payload JSON.
    PayloadLoad { path: PathBuf, reason: String },
    /// Occurs when the payload doesn't conform to the loaded schema, or when a
    /// compressor/encoder rejects its input.
    Encode(String),
    /// Occurs when a representation cannot be inverted: bad armor text, a corrupt compressed
    /// frame, or binary data that doesn't decode against the schema.
    Decode(String),
    /// Decompressed output would be larger than the maximum allowed size.
    DecodeTooLarge { max: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::SchemaLoad {
                ref path,
                ref reason,
            } => write!(f, "Failed to load schema {}: {}", path.display(), reason),
            Error::PayloadLoad {
                ref path,
                ref reason,
            } => write!(f, "Failed to load payload {}: {}", path.display(), reason),
            Error::Encode(ref err) => write!(f, "Encoding failure: {}", err),
            Error::Decode(ref err) => write!(f, "Decoding failure: {}", err),
            Error::DecodeTooLarge { max, actual } => write!(
                f,
                "Decompressed data too long: was {} bytes, maximum allowed is {}",
                actual, max
            ),
        }
    }
}

impl std::error::Error for Error {}
