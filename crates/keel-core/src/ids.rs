//! Decision ID generation, validation, and normalization.
//!
//! IDs look like `DEC-a1b2`: a fixed prefix plus four lowercase hex
//! characters. Generation is intentionally non-deterministic so that
//! independent writers (several agents appending to the same journal) do not
//! need to coordinate. Callers must never rely on deriving the same ID twice
//! from the same inputs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::CoreError;

/// Prefix shared by every decision ID.
pub const DECISION_PREFIX: &str = "DEC";

/// Number of hex characters after `DEC-`.
pub const SUFFIX_LEN: usize = 4;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a new decision ID for the given problem and choice.
///
/// The suffix is a 16-bit fold of an FNV-1a hash over the problem, the
/// choice, the current time in nanoseconds, a per-process sequence number,
/// and eight bytes of OS randomness.
#[must_use]
pub fn generate_id(problem: &str, choice: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut entropy = [0u8; 8];
    // Clock and sequence still vary if the OS source is unavailable.
    if let Err(error) = getrandom::fill(&mut entropy) {
        tracing::debug!(%error, "OS randomness unavailable for decision ID");
    }

    let nanos = nanos.to_le_bytes();
    let sequence = sequence.to_le_bytes();
    let chunks: [&[u8]; 7] = [
        problem.as_bytes(),
        b":",
        choice.as_bytes(),
        b":",
        &nanos,
        &sequence,
        &entropy,
    ];

    let mut hash = FNV_OFFSET;
    for chunk in chunks {
        for byte in chunk {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }

    let folded = (hash ^ (hash >> 16) ^ (hash >> 32) ^ (hash >> 48)) & 0xffff;
    format!("{DECISION_PREFIX}-{folded:04x}")
}

/// Whether `candidate` has the lexical shape of a decision ID.
///
/// The prefix and the hex suffix are both matched case-insensitively.
#[must_use]
pub fn is_valid_id(candidate: &str) -> bool {
    strip_prefix(candidate).is_some_and(is_hex_suffix)
}

/// Normalize user input into the canonical `DEC-xxxx` form.
///
/// Accepts `DEC-a1b2`, `dec-A1B2`, and a bare `a1b2` (surrounding whitespace
/// is ignored). The suffix is always lowercased.
///
/// # Errors
///
/// Returns `CoreError::InvalidIdentifier` for empty input, a suffix of the
/// wrong length, or non-hex characters.
pub fn normalize_id(input: &str) -> Result<String, CoreError> {
    let trimmed = input.trim();
    let suffix = strip_prefix(trimmed).unwrap_or(trimmed);

    if !is_hex_suffix(suffix) {
        return Err(CoreError::InvalidIdentifier {
            input: input.to_string(),
        });
    }

    Ok(format!("{DECISION_PREFIX}-{}", suffix.to_ascii_lowercase()))
}

fn strip_prefix(candidate: &str) -> Option<&str> {
    let prefix_len = DECISION_PREFIX.len();
    let head = candidate.get(..=prefix_len)?;
    let (prefix, dash) = head.split_at(prefix_len);
    if prefix.eq_ignore_ascii_case(DECISION_PREFIX) && dash == "-" {
        candidate.get(prefix_len + 1..)
    } else {
        None
    }
}

fn is_hex_suffix(suffix: &str) -> bool {
    suffix.len() == SUFFIX_LEN && suffix.chars().all(|c| c.is_ascii_hexdigit())
}
