use crate::cli::GlobalFlags;
use crate::cli::root_commands::SubmitArgs;
use crate::commands::shared::actor::resolve_actor;
use crate::context::AppContext;
use crate::output::output_outcome;

/// Handle `educ submit`.
pub async fn handle(args: &SubmitArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = resolve_actor(&args.actor, &ctx.config)?;
    let result = ctx
        .service()
        .submit_for_approval(&args.category, &args.school, &actor)
        .await;
    output_outcome(&result, result.success, result.error.as_deref(), flags.format)
}
