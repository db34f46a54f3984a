use edu_config::EduConfig;
use edu_core::entities::Actor;

use crate::cli::root_commands::ActorArgs;
use crate::commands::shared::parse::parse_role;

/// Build the acting user. Final-approval rights come from configuration,
/// never from the command line.
pub fn resolve_actor(args: &ActorArgs, config: &EduConfig) -> anyhow::Result<Actor> {
    let role = parse_role(&args.role)?;
    let final_approval = config.approval.is_final_approver(&args.actor_id);
    Ok(Actor::new(args.actor_id.clone(), role, args.org.clone()).with_final_approval(final_approval))
}
