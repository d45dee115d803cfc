use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel rebuild`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.service.rebuild().await?;
    output(&report, flags.format)
}
