use clap::{Args, Subcommand};

#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Create a user. The first user becomes ADMIN.
    Create(UserCreateArgs),
}

#[derive(Clone, Debug, Args)]
pub struct UserCreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Assign this role instead of the default.
    #[arg(long)]
    pub role: Option<String>,
}
