use keel_core::errors::CoreError;
use keel_core::ids::normalize_id;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::WhyArgs;
use crate::context::AppContext;
use crate::output::output_decision;

/// Handle `keel why`.
pub async fn handle(args: &WhyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let id = normalize_id(&args.id)?;
    let decision = ctx
        .service
        .by_id(&id)
        .await?
        .ok_or(CoreError::NotFound { id })?;
    output_decision(&decision, flags.format)
}
