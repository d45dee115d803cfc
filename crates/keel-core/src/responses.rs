//! Response types returned as JSON by `keel` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::decision::Decision;

/// Response from `keel context`: decisions touching a file or symbol, plus
/// every active constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionContext {
    pub decisions: Vec<Decision>,
    pub constraints: Vec<Decision>,
}

/// Response from `keel supersede`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SupersedeResponse {
    pub superseded: String,
    pub created: Decision,
}

/// Response from `keel rebuild` (and the report of an automatic resync).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RebuildReport {
    pub rebuilt: bool,
    pub records_read: u32,
    pub lines_skipped: u32,
    pub decisions_indexed: u32,
    pub orphans: u32,
    pub duration_ms: u64,
}

/// Response from `keel status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusResponse {
    pub journal_path: String,
    pub index_path: String,
    pub journal_exists: bool,
    pub stale: bool,
    pub indexed_decisions: u32,
}
