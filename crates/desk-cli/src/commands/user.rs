use anyhow::Context;
use desk_core::inputs::NewUser;
use desk_db::updates::user::UserUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{UserCommands, UserCreateArgs};
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(action: &UserCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        UserCommands::Create(args) => create(args, ctx, flags).await,
    }
}

async fn create(args: &UserCreateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let input = NewUser {
        name: args.name.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
    };
    let mut user = ctx
        .service
        .create_user(None, &input)
        .await
        .context("failed to create user")?;

    if let Some(role) = args.role.as_deref().filter(|role| *role != user.role) {
        let update = UserUpdateBuilder::new().role(role).build();
        user = ctx
            .service
            .update_user(None, &user.id, &update)
            .await
            .with_context(|| format!("failed to assign role {role}"))?;
    }

    output(&user, flags.format)
}
