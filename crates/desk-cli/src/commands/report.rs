use serde::Serialize;

use desk_core::responses::FinancialSummary;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ReportCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct FinanceReport {
    business: String,
    currency_symbol: String,
    #[serde(flatten)]
    summary: FinancialSummary,
}

pub async fn handle(
    action: &ReportCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ReportCommands::Finance => {
            let summary = ctx.service.financial_summary().await?;
            output(
                &FinanceReport {
                    business: ctx.config.business.name.clone(),
                    currency_symbol: ctx.config.business.currency_symbol.clone(),
                    summary,
                },
                flags.format,
            )
        }
    }
}
