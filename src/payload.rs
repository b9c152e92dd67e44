//! The structured payload being benchmarked.
//!
//! A [`Payload`] is an ordered sequence of [`Record`] values, loaded once and never
//! mutated afterwards. Field names are shared verbatim between the JSON form and the
//! Protobuf schema, so the same payload maps onto every representation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A nested record: an identifier and the roles attached to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Member {
    pub id: String,
    pub roles: Vec<String>,
}

/// One top-level payload record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Record {
    pub name: String,
    pub active: bool,
    pub tags: Vec<String>,
    pub members: Vec<Member>,
}

/// The benchmarked payload: an ordered sequence of records.
///
/// Serializes as a bare JSON array, so the text representations carry no wrapper object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload {
    records: Vec<Record>,
}

impl Payload {
    pub fn from_records(records: Vec<Record>) -> Self {
        Payload { records }
    }

    /// Read a payload from a JSON file: an array of records. Fails with
    /// [`Error::PayloadLoad`] if the file is missing or doesn't parse as a payload.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|e| Error::PayloadLoad {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let payload = serde_json::from_slice(&raw).map_err(|e| Error::PayloadLoad {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        log::debug!("loaded payload from {}: {} bytes", path.display(), raw.len());
        Ok(payload)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for Payload {
    fn from(records: Vec<Record>) -> Self {
        Payload::from_records(records)
    }
}
