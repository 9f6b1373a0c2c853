use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use desk_config::{DeskConfig, PROJECT_DIR_NAME};
use desk_db::service::{DeskService, ServiceSettings};
use serde::Serialize;
use tracing::info;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::output::output;

const SECRET_BYTES: usize = 32;

#[derive(Debug, Serialize)]
struct InitResponse {
    project_dir: PathBuf,
    config_path: PathBuf,
    database_path: PathBuf,
    roles_seeded: usize,
}

/// Handle `desk init`.
pub async fn handle(args: &InitArgs, project_root: &Path, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config_path = DeskConfig::project_config_path(project_root);
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            config_path.display()
        );
    }

    let project_dir = project_root.join(PROJECT_DIR_NAME);
    std::fs::create_dir_all(&project_dir)
        .with_context(|| format!("failed to create {}", project_dir.display()))?;

    let mut config = DeskConfig::default();
    config.auth.jwt_secret = generate_secret()?;
    if let Some(name) = &args.name {
        config.business.name.clone_from(name);
    }
    let rendered = toml::to_string_pretty(&config).context("failed to render config")?;
    std::fs::write(&config_path, rendered)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    info!(path = %config_path.display(), "wrote project config");

    // Reload so SHOPDESK_* overrides apply.
    let config = bootstrap::load_config(project_root)?;
    let database_path = config.database.resolved_path(project_root);
    let service = DeskService::new_local(
        &database_path.to_string_lossy(),
        ServiceSettings::from_config(&config),
    )
    .await
    .with_context(|| format!("failed to open database at {}", database_path.display()))?;
    let roles_seeded = service.seed_default_roles().await?;

    output(
        &InitResponse {
            project_dir,
            config_path,
            database_path,
            roles_seeded,
        },
        flags.format,
    )
}

/// Random HS256 signing secret, URL-safe base64.
fn generate_secret() -> anyhow::Result<String> {
    let mut bytes = [0u8; SECRET_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| anyhow::anyhow!("no randomness available: {e}"))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
