use clap::Subcommand;

#[derive(Clone, Debug, Subcommand)]
pub enum StockCommands {
    /// Products at or below their minimum stock level.
    Low,
}
