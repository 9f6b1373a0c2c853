use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `desk` binary.
#[derive(Debug, Parser)]
#[command(name = "desk", version, about = "Shopdesk - back office for a small shop")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .shopdesk)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{NotifyCommands, ReportCommands, StockCommands, UserCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "desk", "--format", "table", "--limit", "10", "--verbose", "stock", "low",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Stock {
                action: StockCommands::Low
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["desk", "report", "finance", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Report {
                action: ReportCommands::Finance
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["desk", "--format", "xml", "notify", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn user_create_requires_all_fields() {
        let parsed = Cli::try_parse_from(["desk", "user", "create", "--name", "Asha"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from([
            "desk",
            "user",
            "create",
            "--name",
            "Asha",
            "--email",
            "asha@example.com",
            "--password",
            "secret123",
            "--role",
            "MANAGER",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::User {
                action: UserCommands::Create(args),
            } => {
                assert_eq!(args.email, "asha@example.com");
                assert_eq!(args.role.as_deref(), Some("MANAGER"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_listen_override() {
        let cli = Cli::try_parse_from(["desk", "serve", "--listen", "127.0.0.1:9000"])
            .expect("cli should parse");
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.listen.as_deref(), Some("127.0.0.1:9000")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn project_flag_is_copied_into_global_flags() {
        let cli = Cli::try_parse_from(["desk", "--project", "/tmp/shop", "notify", "list"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Notify {
                action: NotifyCommands::List
            }
        ));
        assert_eq!(cli.global_flags().project.as_deref(), Some("/tmp/shop"));
    }

    #[test]
    fn notify_send_defaults_to_info() {
        let cli = Cli::try_parse_from([
            "desk", "notify", "send", "--title", "Closing early", "--message", "Shop shuts at 5",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::Notify {
                action: NotifyCommands::Send(args),
            } => {
                assert_eq!(args.title, "Closing early");
                assert_eq!(args.kind, "info");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
