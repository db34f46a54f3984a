use edu_core::entities::NaturalKey;
use edu_core::enums::EntryStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{EntryKeyArgs, TransitionArgs};
use crate::commands::shared::actor::resolve_actor;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output_outcome;

pub fn entry_key(args: &EntryKeyArgs) -> NaturalKey {
    NaturalKey::new(&args.school, &args.category, &args.column)
}

/// Handle `educ transition`.
pub async fn handle(
    args: &TransitionArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let next: EntryStatus = parse_enum(&args.to, "status")?;
    let actor = resolve_actor(&args.actor, &ctx.config)?;
    let result = ctx
        .service()
        .transition_entry(&entry_key(&args.key), next, &actor, args.reason.as_deref())
        .await;
    output_outcome(&result, result.success, result.error.as_deref(), flags.format)
}
