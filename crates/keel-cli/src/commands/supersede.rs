use crate::cli::root_commands::SupersedeArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::input::from_fields;
use crate::context::AppContext;
use crate::identity::git_identity;
use crate::output::{output, output_decision};

/// Handle `keel supersede`.
pub async fn handle(
    args: &SupersedeArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut input = from_fields(&args.fields, &ctx.project_root);
    if !args.fields.agent && input.identifier.is_none() && ctx.config.general.identity_from_git {
        input.identifier = git_identity(&ctx.project_root);
    }

    let response = ctx.service.supersede(&args.id, input).await?;

    if flags.format == OutputFormat::Table {
        println!("Superseded {}\n", response.superseded);
        return output_decision(&response.created, flags.format);
    }
    output(&response, flags.format)
}
