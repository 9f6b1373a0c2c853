use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;

use crate::bootstrap;
use crate::cli::root_commands::ServeArgs;

/// Handle `desk serve`.
pub async fn handle(args: &ServeArgs, project_root: &Path) -> anyhow::Result<()> {
    let config = bootstrap::load_config(project_root)?;
    let addr: SocketAddr = match &args.listen {
        Some(listen) => listen
            .parse()
            .with_context(|| format!("invalid --listen address '{listen}'"))?,
        None => config.server.socket_addr()?,
    };

    let state = desk_server::state_from_config(&config, project_root)
        .await
        .context("failed to prepare the API server (run `desk init` first?)")?;
    desk_server::serve(state, addr)
        .await
        .context("API server failed")
}
