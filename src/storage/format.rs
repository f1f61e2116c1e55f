//! Snapshot encodings.
//!
//! Two formats are supported:
//!
//! - **JSON** (tag `json` / `0`): a human-readable mapping with the keys
//!   `W`, `H`, `D`, `DistanceType`, `NeighborhoodKernel` and `weights`.
//!   Floats are written in shortest round-trip form and parsed back exactly.
//! - **Binary** (tag `bin` / `1`): a compact header followed by the bincode
//!   encoding of the same record.
//!
//! ## Binary layout
//!
//! ```text
//! +-------------------+
//! | Magic "KSOM" (4)  |
//! | Version (2, LE)   |
//! +-------------------+
//! | bincode(Snapshot) |
//! +-------------------+
//! ```

use crate::error::{Result, SomError};
use crate::storage::Snapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Magic number for binary snapshot files.
const MAGIC: &[u8; 4] = b"KSOM";

/// Current binary format version.
const VERSION: u16 = 1;

/// Encoder/decoder for a snapshot format.
pub trait SnapshotCodec: Send + Sync {
    /// Writes `snapshot` to `writer`.
    fn encode(&self, snapshot: &Snapshot, writer: &mut dyn Write) -> Result<()>;

    /// Reads and validates a snapshot from `reader`.
    ///
    /// Missing or malformed fields fail with `CorruptState`.
    fn decode(&self, reader: &mut dyn Read) -> Result<Snapshot>;
}

/// Human-readable JSON mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl SnapshotCodec for JsonCodec {
    fn encode(&self, snapshot: &Snapshot, writer: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, snapshot)?;
        Ok(())
    }

    fn decode(&self, reader: &mut dyn Read) -> Result<Snapshot> {
        let snapshot: Snapshot = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                SomError::Io(e.into())
            } else {
                SomError::CorruptState(e.to_string())
            }
        })?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Compact bincode encoding behind a magic/version header.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl SnapshotCodec for BinaryCodec {
    fn encode(&self, snapshot: &Snapshot, writer: &mut dyn Write) -> Result<()> {
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        bincode::serialize_into(writer, snapshot)?;
        Ok(())
    }

    fn decode(&self, reader: &mut dyn Read) -> Result<Snapshot> {
        let mut header = [0u8; 6];
        reader.read_exact(&mut header).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => SomError::CorruptState("truncated header".to_string()),
            _ => SomError::Io(e),
        })?;

        if &header[0..4] != MAGIC {
            return Err(SomError::CorruptState("invalid magic number".to_string()));
        }
        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(SomError::CorruptState(format!(
                "unsupported binary version {}",
                version
            )));
        }

        let snapshot: Snapshot = bincode::deserialize_from(reader).map_err(|e| match *e {
            bincode::ErrorKind::Io(io) if io.kind() != ErrorKind::UnexpectedEof => SomError::Io(io),
            other => SomError::CorruptState(other.to_string()),
        })?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Supported snapshot formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SnapshotFormat {
    /// Human-readable JSON mapping.
    #[default]
    Json = 0,
    /// Compact binary.
    Binary = 1,
}

impl SnapshotFormat {
    /// All formats, in tag order.
    pub const ALL: [SnapshotFormat; 2] = [SnapshotFormat::Json, SnapshotFormat::Binary];

    /// Returns the codec for this format.
    pub fn codec(&self) -> &'static dyn SnapshotCodec {
        match self {
            SnapshotFormat::Json => &JsonCodec,
            SnapshotFormat::Binary => &BinaryCodec,
        }
    }

    /// Preferred file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Binary => "som",
        }
    }

    /// Infers the format from a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                SomError::UnsupportedFormat(format!("no file extension on {}", path.display()))
            })?;
        ext.parse()
    }
}

impl TryFrom<u8> for SnapshotFormat {
    type Error = SomError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SnapshotFormat::Json),
            1 => Ok(SnapshotFormat::Binary),
            other => Err(SomError::UnsupportedFormat(format!("format tag {}", other))),
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = SomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "0" => Ok(SnapshotFormat::Json),
            "bin" | "binary" | "bincode" | "som" | "1" => Ok(SnapshotFormat::Binary),
            other => Err(SomError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotFormat::Json => f.write_str("json"),
            SnapshotFormat::Binary => f.write_str("binary"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            width: 1,
            height: 2,
            dimensions: 2,
            distance_type: 0,
            kernel: 0,
            weights: vec![0.1, 0.7, 0.30000000000000004, 0.9999999999999999],
        }
    }

    fn encode(codec: &dyn SnapshotCodec, s: &Snapshot) -> Vec<u8> {
        let mut buf = Vec::new();
        codec.encode(s, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_format_tags() {
        assert_eq!("json".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Json);
        assert_eq!("BIN".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Binary);
        assert_eq!(SnapshotFormat::try_from(1).unwrap(), SnapshotFormat::Binary);

        assert!(matches!(
            "yaml".parse::<SnapshotFormat>(),
            Err(SomError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            SnapshotFormat::try_from(2),
            Err(SomError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_path() {
        assert_eq!(SnapshotFormat::from_path("a/b.json").unwrap(), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_path("model.som").unwrap(), SnapshotFormat::Binary);
        assert!(SnapshotFormat::from_path("model.rocksdb").is_err());
        assert!(SnapshotFormat::from_path("model").is_err());
    }

    #[test]
    fn test_json_is_lossless() {
        let s = snapshot();
        let buf = encode(&JsonCodec, &s);
        let decoded = JsonCodec.decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded.weights, s.weights);
    }

    #[test]
    fn test_json_is_readable_mapping() {
        let buf = encode(&JsonCodec, &snapshot());
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"W\": 1"));
        assert!(text.contains("\"NeighborhoodKernel\": 0"));
    }

    #[test]
    fn test_json_missing_field() {
        let text = r#"{"W": 1, "H": 1, "D": 1, "DistanceType": 0, "weights": [0.5]}"#;
        let err = JsonCodec.decode(&mut text.as_bytes()).unwrap_err();
        assert!(matches!(err, SomError::CorruptState(_)));
    }

    #[test]
    fn test_json_accepts_legacy_kernel_key() {
        let text = r#"{"W": 1, "H": 1, "D": 1, "DistanceType": 0, "BMDistType": 2, "weights": [0.5]}"#;
        let decoded = JsonCodec.decode(&mut text.as_bytes()).unwrap();
        assert_eq!(decoded.kernel, 2);
    }

    #[test]
    fn test_json_wrong_weight_count() {
        let text = r#"{"W": 2, "H": 1, "D": 1, "DistanceType": 0, "NeighborhoodKernel": 0, "weights": [0.5]}"#;
        assert!(matches!(
            JsonCodec.decode(&mut text.as_bytes()),
            Err(SomError::CorruptState(_))
        ));
    }

    #[test]
    fn test_binary_header() {
        let buf = encode(&BinaryCodec, &snapshot());
        assert_eq!(&buf[0..4], MAGIC);
        assert_eq!(u16::from_le_bytes([buf[4], buf[5]]), VERSION);

        let decoded = BinaryCodec.decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, snapshot());
    }

    #[test]
    fn test_binary_bad_magic() {
        let mut buf = encode(&BinaryCodec, &snapshot());
        buf[0] = b'X';
        assert!(matches!(
            BinaryCodec.decode(&mut buf.as_slice()),
            Err(SomError::CorruptState(_))
        ));
    }

    #[test]
    fn test_binary_truncated() {
        let buf = encode(&BinaryCodec, &snapshot());
        let truncated = &buf[..buf.len() - 3];
        assert!(matches!(
            BinaryCodec.decode(&mut &truncated[..]),
            Err(SomError::CorruptState(_))
        ));
        assert!(matches!(
            BinaryCodec.decode(&mut &buf[..3]),
            Err(SomError::CorruptState(_))
        ));
    }
}
