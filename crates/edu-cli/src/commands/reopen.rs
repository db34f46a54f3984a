use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReopenArgs;
use crate::commands::shared::actor::resolve_actor;
use crate::commands::transition::entry_key;
use crate::context::AppContext;
use crate::output::output_outcome;

/// Handle `educ reopen`.
pub async fn handle(args: &ReopenArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = resolve_actor(&args.actor, &ctx.config)?;
    let result = ctx
        .service()
        .reopen_entry(&entry_key(&args.key), &actor, args.reason.as_deref())
        .await;
    output_outcome(&result, result.success, result.error.as_deref(), flags.format)
}
