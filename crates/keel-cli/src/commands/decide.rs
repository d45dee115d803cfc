use keel_core::errors::CoreError;
use keel_core::validation::{validate_input, validate_value};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::DecideArgs;
use crate::commands::shared::input::{attribute, from_fields, read_json_arg};
use crate::context::AppContext;
use crate::identity::git_identity;
use crate::output::output_decision;

/// Handle `keel decide`.
pub async fn handle(args: &DecideArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let validated = match args.json.as_deref() {
        Some(raw) => validate_value(&read_json_arg(raw)?),
        None => validate_input(&from_fields(&args.fields, &ctx.project_root)),
    };
    let mut input = validated.map_err(CoreError::from)?;

    if ctx.config.general.identity_from_git {
        attribute(&mut input.decided_by, || git_identity(&ctx.project_root));
    }

    let decision = ctx.service.record_decision(input).await?;
    output_decision(&decision, flags.format)
}
