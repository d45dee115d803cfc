use crate::cli::GlobalFlags;
use crate::cli::root_commands::SqlArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel sql`.
pub async fn handle(args: &SqlArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rows = ctx.service.read_only_sql(&args.query).await?;
    output(&rows, flags.format)
}
