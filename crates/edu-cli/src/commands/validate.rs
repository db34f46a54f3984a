use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateArgs;
use crate::commands::shared::parse::parse_assignments;
use crate::context::AppContext;
use crate::output::output_outcome;

/// Handle `educ validate`.
pub async fn handle(
    args: &ValidateArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let values = parse_assignments(&args.set)?;
    let validation = ctx
        .service()
        .validate_category_form(&args.category, &values, args.school.as_deref())
        .await?;
    output_outcome(&validation, validation.valid, Some("validation failed"), flags.format)
}
