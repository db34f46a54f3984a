use edu_core::enums::EntryStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CanTransitionArgs;
use crate::commands::shared::actor::resolve_actor;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `educ can-transition`. A denial is an answer, not a failure.
pub async fn handle(
    args: &CanTransitionArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let current: EntryStatus = parse_enum(&args.from, "status")?;
    let next: EntryStatus = parse_enum(&args.to, "status")?;
    let actor = resolve_actor(&args.actor, &ctx.config)?;

    let service = ctx.service();
    let target = service.target_for(&args.school).await?;
    let decision = service.can_transition(current, next, &actor, &target);
    output(&decision, flags.format)
}
