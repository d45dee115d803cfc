//! Cheap fingerprint of the journal file used as the index staleness marker.

use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

/// Modification time and length of the journal at one point in time.
///
/// Any append changes the length; a rewrite of equal length almost always
/// changes the mtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSignature {
    pub mtime_ns: u64,
    pub len: u64,
}

impl LogSignature {
    /// Read the signature of `path`, or `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for anything other than "not found".
    pub fn of(path: &Path) -> std::io::Result<Option<Self>> {
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let mtime_ns = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
        Ok(Some(Self {
            mtime_ns,
            len: meta.len(),
        }))
    }
}
