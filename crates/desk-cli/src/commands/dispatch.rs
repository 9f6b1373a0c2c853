use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::User { action } => commands::user::handle(&action, ctx, flags).await,
        Commands::Report { action } => commands::report::handle(&action, ctx, flags).await,
        Commands::Stock { action } => commands::stock::handle(&action, ctx, flags).await,
        Commands::Notify { action } => commands::notify::handle(&action, ctx, flags).await,
        Commands::Init(_) | Commands::Serve(_) => {
            unreachable!("init/serve are pre-dispatched in main")
        }
    }
}
