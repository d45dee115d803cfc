use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Decide(args) => commands::decide::handle(&args, ctx, flags).await,
        Commands::Supersede(args) => commands::supersede::handle(&args, ctx, flags).await,
        Commands::Why(args) => commands::why::handle(&args, ctx, flags).await,
        Commands::Search(args) => commands::search::handle(&args, ctx, flags).await,
        Commands::Context(args) => commands::context::handle(&args, ctx, flags).await,
        Commands::Rebuild => commands::rebuild::handle(ctx, flags).await,
        Commands::Status => commands::status::handle(ctx, flags).await,
        Commands::Sql(args) => commands::sql::handle(&args, ctx, flags).await,
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
