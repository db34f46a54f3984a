use std::path::Path;

use anyhow::Context;
use edu_approval::ApprovalService;
use edu_config::EduConfig;
use edu_db::EduDb;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub db: EduDb,
    pub config: EduConfig,
}

/// The engine wired to one database playing every collaborator role.
pub type Service<'a> = ApprovalService<&'a EduDb, &'a EduDb, &'a EduDb, &'a EduDb>;

impl AppContext {
    pub async fn init(project_root: &Path, config: EduConfig) -> anyhow::Result<Self> {
        let path = database_path(project_root, &config);
        let db = EduDb::open_local(&path)
            .await
            .with_context(|| format!("failed to open database at {path}"))?;
        tracing::debug!(root = %project_root.display(), database = %path, "context ready");

        Ok(Self { db, config })
    }

    pub const fn service(&self) -> Service<'_> {
        ApprovalService::new(&self.db, &self.db, &self.db, &self.db)
    }
}

/// Resolve `database.path` against the project root. `:memory:` and
/// absolute paths are used as given.
#[must_use]
pub fn database_path(project_root: &Path, config: &EduConfig) -> String {
    if config.database.is_in_memory() {
        return config.database.path.clone();
    }
    let configured = Path::new(&config.database.path);
    if configured.is_absolute() {
        config.database.path.clone()
    } else {
        project_root.join(configured).to_string_lossy().into_owned()
    }
}
