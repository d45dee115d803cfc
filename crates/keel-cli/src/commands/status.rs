use keel_core::responses::StatusResponse;
use keel_db::sync::SyncOutcome;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct StatusReport {
    #[serde(flatten)]
    status: StatusResponse,
    /// Whether opening this command had to rebuild a stale index.
    rebuilt_on_open: bool,
    /// IDs mutated in the journal but never created.
    orphans: Vec<String>,
}

/// Handle `keel status`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = StatusReport {
        status: ctx.service.status().await?,
        rebuilt_on_open: matches!(ctx.service.opened_with(), SyncOutcome::Rebuilt(_)),
        orphans: ctx
            .service
            .orphans()
            .await?
            .into_iter()
            .map(|record| record.id)
            .collect(),
    };
    output(&report, flags.format)
}
