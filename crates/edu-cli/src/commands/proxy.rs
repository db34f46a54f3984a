use edu_approval::ProxyOptions;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{ProxyCommands, ProxySaveArgs, ProxySubmitArgs};
use crate::commands::shared::actor::resolve_actor;
use crate::commands::shared::parse::parse_assignments;
use crate::context::AppContext;
use crate::output::output_outcome;

/// Handle `educ proxy`.
pub async fn handle(
    action: &ProxyCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProxyCommands::Save(args) => save(args, ctx, flags).await,
        ProxyCommands::Submit(args) => submit(args, ctx, flags).await,
    }
}

async fn save(args: &ProxySaveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let values = parse_assignments(&args.form.set)?;
    let options = ProxyOptions {
        category_id: args.form.category.clone(),
        school_id: args.form.school.clone(),
        proxy_actor: resolve_actor(&args.actor, &ctx.config)?,
        original_school_id: args.original.clone(),
        reason: args.reason.clone(),
        auto_approve: false,
    };

    let result = ctx.service().save_proxy_form_data(&values, &options).await;
    output_outcome(&result, result.success, result.error.as_deref(), flags.format)
}

async fn submit(
    args: &ProxySubmitArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let options = ProxyOptions {
        category_id: args.category.clone(),
        school_id: args.school.clone(),
        proxy_actor: resolve_actor(&args.actor, &ctx.config)?,
        original_school_id: args.original.clone(),
        reason: args.reason.clone(),
        auto_approve: args.auto_approve,
    };

    let result = ctx.service().submit_proxy_data(&options).await;
    if args.auto_approve && !result.auto_approved && result.success {
        tracing::warn!(actor_id = %options.proxy_actor.id, "auto-approval not granted, entries left pending");
    }
    output_outcome(&result, result.success, result.error.as_deref(), flags.format)
}
