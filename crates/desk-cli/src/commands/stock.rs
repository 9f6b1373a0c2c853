use crate::cli::GlobalFlags;
use crate::cli::subcommands::StockCommands;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(action: &StockCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        StockCommands::Low => {
            let mut products = ctx.service.low_stock_products().await?;
            if let Some(limit) = flags.limit {
                products.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            }
            output(&products, flags.format)
        }
    }
}
