use std::path::{Path, PathBuf};

use anyhow::Context;
use edu_config::{EduConfig, PROJECT_DIR};
use edu_db::EduDb;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::database_path;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub project_root: String,
    pub config_path: String,
    pub config_written: bool,
    pub database: String,
}

/// Handle `educ init`.
pub async fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = match flags.project.as_deref() {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let response = initialize(&root, args.force).await?;
    output(&response, flags.format)
}

/// Create `.edu/`, write a default `config.toml` unless one exists, and
/// create the database with its schema.
pub async fn initialize(root: &Path, force: bool) -> anyhow::Result<InitResponse> {
    let project_dir = root.join(PROJECT_DIR);
    std::fs::create_dir_all(&project_dir)
        .with_context(|| format!("failed to create {}", project_dir.display()))?;

    let config_path = project_dir.join("config.toml");
    let config_written = force || !config_path.exists();
    if config_written {
        let rendered = toml::to_string_pretty(&EduConfig::default())
            .context("failed to render default config")?;
        std::fs::write(&config_path, rendered)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
    }

    let raw = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let config: EduConfig = toml::from_str(&raw)
        .with_context(|| format!("invalid config at {}", config_path.display()))?;
    config.validate()?;

    let database = database_path(root, &config);
    if !config.database.is_in_memory() {
        if let Some(parent) = Path::new(&database).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    EduDb::open_local(&database)
        .await
        .with_context(|| format!("failed to create database at {database}"))?;
    tracing::debug!(root = %root.display(), "project initialized");

    Ok(InitResponse {
        project_root: root.display().to_string(),
        config_path: config_path.display().to_string(),
        config_written,
        database,
    })
}
