use std::path::Path;

use anyhow::Context;
use desk_config::DeskConfig;
use desk_db::service::{DeskService, ServiceSettings};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: DeskService,
    pub config: DeskConfig,
}

impl AppContext {
    /// Open the project database described by `config`.
    pub async fn init(project_root: &Path, config: DeskConfig) -> anyhow::Result<Self> {
        let db_path = config.database.resolved_path(project_root);
        let service = DeskService::new_local(
            &db_path.to_string_lossy(),
            ServiceSettings::from_config(&config),
        )
        .await
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

        Ok(Self { service, config })
    }
}
