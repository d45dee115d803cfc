//! The append-only decision journal (`.keel/decisions.jsonl`).
//!
//! The journal is the source of truth; the index is rebuilt from it. Each
//! line is one `DecisionRecord`. Lines are only ever appended, never
//! rewritten, and each append is a single `write_all` of a complete line.

mod signature;

pub use signature::LogSignature;

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use keel_core::decision::DecisionRecord;
use serde::Serialize;
use serde_jsonlines::JsonLinesWriter;

use crate::error::DatabaseError;

/// A journal line that could not be parsed. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogParseWarning {
    /// 1-based line number in the journal file.
    pub line: usize,
    pub message: String,
}

/// Every parseable record in file order plus the lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalRead {
    pub records: Vec<DecisionRecord>,
    pub warnings: Vec<LogParseWarning>,
}

/// Handle on the journal file. Holds no open descriptor between calls.
#[derive(Debug, Clone)]
pub struct DecisionJournal {
    path: PathBuf,
}

impl DecisionJournal {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Current signature of the journal, `None` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Journal` if the file metadata cannot be read.
    pub fn signature(&self) -> Result<Option<LogSignature>, DatabaseError> {
        Ok(LogSignature::of(&self.path)?)
    }

    /// Append one record as a single JSON line.
    ///
    /// Creates the parent directory and the file on first use. If the file
    /// ends in a torn line (no trailing newline), a newline is written first
    /// so the new record starts on its own line.
    ///
    /// Returns the number of bytes appended.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Journal` if the directory, the file, or the
    /// write fails.
    pub fn append(&self, record: &DecisionRecord) -> Result<u64, DatabaseError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut buf = Vec::new();
        if ends_without_newline(&mut file)? {
            buf.push(b'\n');
        }
        JsonLinesWriter::new(&mut buf).write(record)?;

        file.write_all(&buf)?;
        tracing::debug!(id = %record.id, bytes = buf.len(), "appended journal record");
        Ok(buf.len() as u64)
    }

    /// Read and parse every line of the journal.
    ///
    /// Blank lines are ignored. Lines that fail to parse are skipped and
    /// reported in `JournalRead::warnings`. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Journal` only if the file exists but cannot be
    /// read.
    pub fn read_all(&self) -> Result<JournalRead, DatabaseError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(JournalRead::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut read = JournalRead::default();
        for (idx, line) in bytes.split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<DecisionRecord>(line) {
                Ok(record) => read.records.push(record),
                Err(e) => {
                    let warning = LogParseWarning {
                        line: idx + 1,
                        message: e.to_string(),
                    };
                    tracing::warn!(
                        path = %self.path.display(),
                        line = warning.line,
                        "skipping unparsable journal line: {}",
                        warning.message
                    );
                    read.warnings.push(warning);
                }
            }
        }
        Ok(read)
    }
}

fn ends_without_newline(file: &mut std::fs::File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::decision::{DecidedBy, DecisionRecord};
    use keel_core::enums::{DecisionStatus, DecisionType};
    use pretty_assertions::assert_eq;

    fn creation(id: &str) -> DecisionRecord {
        DecisionRecord {
            id: id.to_string(),
            created_at: Some("2026-03-01T10:00:00Z".parse().unwrap()),
            kind: Some(DecisionType::Process),
            problem: Some(format!("problem {id}")),
            choice: Some("choice".into()),
            decided_by: Some(DecidedBy::human(None)),
            status: Some(DecisionStatus::Active),
            ..DecisionRecord::default()
        }
    }

    fn journal_in(dir: &tempfile::TempDir) -> DecisionJournal {
        DecisionJournal::new(dir.path().join(".keel").join("decisions.jsonl"))
    }

    #[test]
    fn append_creates_directory_and_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = journal_in(&dir);
        assert!(!journal.exists());
        assert_eq!(journal.signature().unwrap(), None);

        let bytes = journal.append(&creation("DEC-0001")).unwrap();
        assert!(journal.exists());
        assert_eq!(journal.signature().unwrap().unwrap().len, bytes);
    }

    #[test]
    fn append_then_read_roundtrips_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = journal_in(&dir);
        let records: Vec<DecisionRecord> = (0..25)
            .map(|i| creation(&format!("DEC-{i:04x}")))
            .chain([DecisionRecord::supersession("DEC-0000", "DEC-0001")])
            .collect();
        for record in &records {
            journal.append(record).unwrap();
        }

        let read = journal.read_all().unwrap();
        assert!(read.warnings.is_empty());
        assert_eq!(read.records, records);
    }

    #[test]
    fn each_append_is_exactly_one_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = journal_in(&dir);
        journal.append(&creation("DEC-0001")).unwrap();
        journal
            .append(&DecisionRecord::supersession("DEC-0001", "DEC-0002"))
            .unwrap();

        let text = std::fs::read_to_string(journal.path()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn read_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let read = journal_in(&dir).read_all().unwrap();
        assert_eq!(read, JournalRead::default());
    }

    #[test]
    fn unparsable_lines_become_warnings() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = journal_in(&dir);
        journal.append(&creation("DEC-0001")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(journal.path()).unwrap();
            file.write_all(b"{not json}\n\n{\"problem\":\"no id\"}\n").unwrap();
        }
        journal.append(&creation("DEC-0002")).unwrap();

        let read = journal.read_all().unwrap();
        let ids: Vec<&str> = read.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["DEC-0001", "DEC-0002"]);
        let lines: Vec<usize> = read.warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn append_after_torn_line_starts_fresh_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = journal_in(&dir);
        journal.append(&creation("DEC-0001")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(journal.path()).unwrap();
            file.write_all(b"{\"id\":\"DEC-00").unwrap();
        }
        journal.append(&creation("DEC-0002")).unwrap();

        let read = journal.read_all().unwrap();
        let ids: Vec<&str> = read.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["DEC-0001", "DEC-0002"]);
        assert_eq!(read.warnings.len(), 1);
    }

    #[test]
    fn signature_tracks_growth() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = journal_in(&dir);
        journal.append(&creation("DEC-0001")).unwrap();
        let before = journal.signature().unwrap().unwrap();
        let bytes = journal.append(&creation("DEC-0002")).unwrap();
        let after = journal.signature().unwrap().unwrap();
        assert_eq!(after.len, before.len + bytes);
        assert_ne!(before, after);
    }
}
