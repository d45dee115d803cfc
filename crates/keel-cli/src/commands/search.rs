use keel_core::decision::Decision;
use keel_core::enums::{DecisionStatus, DecisionType};
use keel_db::query::QueryFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SearchArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output_decisions;

/// Handle `keel search`.
///
/// With no query or lookup flag this lists every decision matching the
/// filters, newest first.
pub async fn handle(args: &SearchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = QueryFilter {
        kind: args
            .kind
            .as_deref()
            .map(|raw| parse_enum::<DecisionType>(raw, "type"))
            .transpose()?,
        status: args
            .status
            .as_deref()
            .map(|raw| parse_enum::<DecisionStatus>(raw, "status"))
            .transpose()?,
        limit: effective_limit(flags.limit, ctx.config.general.default_limit),
    };
    let service = &ctx.service;

    let decisions = if let Some(file) = args.file.as_deref() {
        narrow(service.by_file(file).await?, filter)
    } else if let Some(symbol) = args.symbol.as_deref() {
        narrow(service.by_symbol(symbol).await?, filter)
    } else if let Some(bead) = args.bead.as_deref() {
        narrow(service.by_bead(bead).await?, filter)
    } else if let Some(query) = args.query.as_deref() {
        if args.literal {
            service.substring_search(query, filter).await?
        } else {
            service.full_text(query, filter).await?
        }
    } else {
        service.all(filter).await?
    };

    output_decisions(&decisions, flags.format)
}

/// Apply type, status, and limit to an association lookup, which has no
/// SQL-level filters of its own.
fn narrow(decisions: Vec<Decision>, filter: QueryFilter) -> Vec<Decision> {
    let limit = filter
        .limit
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(usize::MAX);
    decisions
        .into_iter()
        .filter(|d| filter.kind.is_none_or(|kind| d.kind == kind))
        .filter(|d| filter.status.is_none_or(|status| d.status == status))
        .take(limit)
        .collect()
}
