/// Compute effective limit with precedence: `--limit` flag, then the
/// configured default. Zero means no limit.
#[must_use]
pub fn effective_limit(flag: Option<u32>, configured: u32) -> Option<u32> {
    Some(flag.unwrap_or(configured)).filter(|limit| *limit > 0)
}
