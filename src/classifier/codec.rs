// Binary encoding of a trained classifier.
//
// Layout (version 1):
//
//   offset  size  field
//   0       4     magic "INKP"
//   4       2     format version, u16 LE
//   6       4     payload length, u32 LE
//   10      4     CRC-32 of the payload, u32 LE
//   14      n     payload: bincode of ClassifierRecord
//
// Decoding re-validates everything: the envelope, the checksum, every
// Shingling invariant (shingle hashes are recomputed from their tokens), the
// options, and the normalization factor. The text pipeline is rebuilt from
// its stored config. Any failure is a validation error.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::model::Classifier;
use super::options::ClassifierOptions;
use crate::error::{EngineError, EngineResult};
use crate::shingling::{ShingleHash, Shingling};
use crate::text::TextPipeline;

pub const MAGIC: &[u8; 4] = b"INKP";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 14;

/// Borrowed view of a classifier, written as the payload.
#[derive(Serialize)]
struct ClassifierRecordRef<'a> {
    id: &'a Uuid,
    name: &'a str,
    options: &'a ClassifierOptions,
    model: &'a Shingling,
    document_frequencies: &'a BTreeMap<ShingleHash, u32>,
    training_texts: u32,
    normalization_factor: f64,
    trained_at: &'a DateTime<Utc>,
}

/// Owned payload read back. Field order must match ClassifierRecordRef.
#[derive(Deserialize)]
struct ClassifierRecord {
    id: Uuid,
    name: String,
    options: ClassifierOptions,
    model: Shingling,
    document_frequencies: BTreeMap<ShingleHash, u32>,
    training_texts: u32,
    normalization_factor: f64,
    trained_at: DateTime<Utc>,
}

fn malformed(detail: impl std::fmt::Display) -> EngineError {
    EngineError::validation(format!("malformed encoded classifier: {detail}"))
}

pub fn encode(classifier: &Classifier) -> EngineResult<Vec<u8>> {
    let record = ClassifierRecordRef {
        id: &classifier.id(),
        name: classifier.name(),
        options: classifier.options(),
        model: classifier.model(),
        document_frequencies: classifier.document_frequencies(),
        training_texts: classifier.training_texts(),
        normalization_factor: classifier.normalization_factor(),
        trained_at: &classifier.trained_at(),
    };
    let payload = bincode::serialize(&record)
        .map_err(|e| EngineError::computation(format!("failed to encode classifier: {e}")))?;
    let length = u32::try_from(payload.len()).map_err(|_| {
        EngineError::computation(format!(
            "encoded classifier too large: {} bytes",
            payload.len()
        ))
    })?;

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    write_envelope(&mut out, length, crc32fast::hash(&payload), &payload)
        .map_err(|e| EngineError::computation(format!("failed to encode classifier: {e}")))?;

    debug!(
        name = classifier.name(),
        bytes = out.len(),
        "Encoded classifier"
    );
    Ok(out)
}

fn write_envelope(
    out: &mut Vec<u8>,
    length: u32,
    checksum: u32,
    payload: &[u8],
) -> std::io::Result<()> {
    out.write_all(MAGIC)?;
    out.write_u16::<LittleEndian>(FORMAT_VERSION)?;
    out.write_u32::<LittleEndian>(length)?;
    out.write_u32::<LittleEndian>(checksum)?;
    out.write_all(payload)?;
    Ok(())
}

/// Read the format version without decoding the payload.
pub fn peek_version(bytes: &[u8]) -> EngineResult<u16> {
    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cursor
        .read_exact(&mut magic)
        .map_err(|_| malformed("truncated header"))?;
    if &magic != MAGIC {
        return Err(malformed("bad magic"));
    }
    cursor
        .read_u16::<LittleEndian>()
        .map_err(|_| malformed("truncated header"))
}

pub fn decode(bytes: &[u8]) -> EngineResult<Classifier> {
    let version = peek_version(bytes)?;
    if version != FORMAT_VERSION {
        return Err(EngineError::validation(format!(
            "unsupported classifier format version: {version}"
        )));
    }

    let mut cursor = Cursor::new(&bytes[6..]);
    let length = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| malformed("truncated header"))? as usize;
    let checksum = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| malformed("truncated header"))?;

    let payload = &bytes[HEADER_LEN..];
    if payload.len() != length {
        return Err(malformed(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            length
        )));
    }
    if crc32fast::hash(payload) != checksum {
        return Err(malformed("checksum mismatch"));
    }

    let record: ClassifierRecord = bincode::deserialize(payload).map_err(malformed)?;
    from_record(record)
}

fn from_record(record: ClassifierRecord) -> EngineResult<Classifier> {
    record.options.validate().map_err(malformed)?;
    if record.name.trim().is_empty() {
        return Err(malformed("empty name"));
    }
    if record.model.multiplicity() != record.options.multiplicity {
        return Err(malformed(format!(
            "model multiplicity {} does not match options multiplicity {}",
            record.model.multiplicity(),
            record.options.multiplicity
        )));
    }
    if record.training_texts == 0 {
        return Err(malformed("no training texts"));
    }
    if !record.normalization_factor.is_finite() || record.normalization_factor <= 0.0 {
        return Err(malformed(format!(
            "normalization factor {}",
            record.normalization_factor
        )));
    }

    let pipeline = TextPipeline::new(record.options.pipeline.clone()).map_err(malformed)?;

    Ok(Classifier::from_parts(
        record.id,
        record.name,
        record.options,
        pipeline,
        record.model,
        record.document_frequencies,
        record.training_texts,
        record.normalization_factor,
        record.trained_at,
    ))
}

impl Classifier {
    /// Serialize into the versioned binary format.
    pub fn encode(&self) -> EngineResult<Vec<u8>> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> EngineResult<Self> {
        decode(bytes)
    }
}
