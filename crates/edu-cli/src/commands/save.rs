use edu_approval::SaveOptions;
use edu_core::enums::EntryStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SaveArgs;
use crate::commands::shared::actor::resolve_actor;
use crate::commands::shared::parse::parse_assignments;
use crate::context::AppContext;
use crate::output::output_outcome;

/// Handle `educ save`.
pub async fn handle(args: &SaveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let values = parse_assignments(&args.form.set)?;
    let options = SaveOptions {
        category_id: args.form.category.clone(),
        school_id: args.form.school.clone(),
        actor: resolve_actor(&args.actor, &ctx.config)?,
        status: args.submit.then_some(EntryStatus::Pending),
    };

    let result = ctx.service().save_form_data(&values, &options).await;
    output_outcome(&result, result.success, result.error.as_deref(), flags.format)
}
