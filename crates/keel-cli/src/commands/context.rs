use crate::cli::GlobalFlags;
use crate::cli::root_commands::ContextArgs;
use crate::context::AppContext;
use crate::output::output_context;

/// Handle `keel context`.
pub async fn handle(args: &ContextArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let result = ctx.service.context_for(args.target.trim()).await?;
    output_context(&result, flags.format)
}
