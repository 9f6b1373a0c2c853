use std::path::Path;

use anyhow::Context;
use desk_config::DeskConfig;

/// Load `<project>/.env` (falling back to the current directory), then the
/// layered configuration rooted at `project_root`.
pub fn load_config(project_root: &Path) -> anyhow::Result<DeskConfig> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    } else {
        dotenvy::dotenv().ok();
    }

    DeskConfig::load_from(project_root).context("failed to load configuration")
}
