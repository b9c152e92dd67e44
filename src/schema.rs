//! Runtime loading of the user-supplied `.proto` schema.
//!
//! The schema file is compiled once into a descriptor pool and the resulting message
//! descriptor is shared by the encode and decode paths for the rest of the run. The
//! original report tooling loaded its schema separately for each path; a single cached
//! load replaces that here.

use std::path::Path;

use prost_reflect::{DescriptorPool, MessageDescriptor};

use crate::error::{Error, Result};

/// Name of the top-level message the payload encodes against.
pub const TOP_MESSAGE: &str = "RecordSet";

/// A compiled schema, holding the descriptor for the top-level payload message.
#[derive(Clone, Debug)]
pub struct Schema {
    message: MessageDescriptor,
}

impl Schema {
    /// Compile a `.proto` file and look up the [`TOP_MESSAGE`] message in it. Fails with
    /// [`Error::SchemaLoad`] if the file is missing, doesn't compile, or doesn't contain
    /// the expected message.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let include = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let descriptors = protox::compile([path], [include]).map_err(|e| Error::SchemaLoad {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let pool =
            DescriptorPool::from_file_descriptor_set(descriptors).map_err(|e| Error::SchemaLoad {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        let message = pool
            .get_message_by_name(TOP_MESSAGE)
            .ok_or_else(|| Error::SchemaLoad {
                path: path.to_owned(),
                reason: format!("schema has no message named {}", TOP_MESSAGE),
            })?;
        log::info!("loaded schema {} ({})", path.display(), message.full_name());
        Ok(Schema { message })
    }

    /// The descriptor the payload is encoded and decoded against.
    pub fn message(&self) -> &MessageDescriptor {
        &self.message
    }
}
