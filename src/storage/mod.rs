//! Snapshot persistence.
//!
//! The lattice state is exchanged as one [`Snapshot`] record. Encoding is
//! delegated to a [`SnapshotCodec`] chosen by [`SnapshotFormat`].

mod format;
mod snapshot;

pub use format::{BinaryCodec, JsonCodec, SnapshotCodec, SnapshotFormat};
pub use snapshot::Snapshot;

use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `snapshot` to `path`.
///
/// The data goes to a sibling temporary file first and is renamed into place,
/// so readers never observe a half-written snapshot.
pub fn save<P: AsRef<Path>>(snapshot: &Snapshot, path: P, format: SnapshotFormat) -> Result<()> {
    let path = path.as_ref();
    let tmp = temp_path(path);

    match write_file(snapshot, &tmp, format) {
        Ok(()) => {
            fs::rename(&tmp, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

/// Reads a snapshot from `path`.
pub fn load<P: AsRef<Path>>(path: P, format: SnapshotFormat) -> Result<Snapshot> {
    let mut reader = BufReader::new(File::open(path)?);
    format.codec().decode(&mut reader)
}

fn write_file(snapshot: &Snapshot, path: &Path, format: SnapshotFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    format.codec().encode(snapshot, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
