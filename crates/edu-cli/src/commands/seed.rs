use anyhow::Context;
use edu_db::ReferenceData;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SeedArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct SeedResponse {
    regions: usize,
    sectors: usize,
    schools: usize,
    categories: usize,
    columns: usize,
}

/// Handle `educ seed`.
pub async fn handle(args: &SeedArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file))?;
    let data = ReferenceData::from_json(&raw)
        .with_context(|| format!("invalid reference data in {}", args.file))?;
    ctx.db.seed(&data).await.context("failed to seed reference data")?;

    let response = SeedResponse {
        regions: data.regions.len(),
        sectors: data.sectors.len(),
        schools: data.schools.len(),
        categories: data.categories.len(),
        columns: data.columns.len(),
    };
    output(&response, flags.format)
}
