//! Inventory reporting.

use clap::Subcommand;
use sqlx::PgPool;
use vitrine_core::{Product, StockSummary};

/// Sub-commands available under `stock`.
#[derive(Debug, Subcommand)]
pub enum StockCommands {
    /// Print sellable stock for every product
    Report {
        /// Only list products with variants at or below their reorder threshold
        #[arg(long)]
        reorder_only: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub(crate) async fn run(pool: &PgPool, command: StockCommands) -> anyhow::Result<()> {
    match command {
        StockCommands::Report { reorder_only, json } => {
            let products = vitrine_db::list_all_products(pool).await?;
            let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
            let variants = vitrine_db::list_variants_for(pool, &ids).await?;

            let rows: Vec<(&Product, StockSummary)> = products
                .iter()
                .map(|p| (p, StockSummary::compute(p, &variants)))
                .filter(|(_, s)| !reorder_only || !s.reorder_skus.is_empty())
                .collect();

            if json {
                let summaries: Vec<&StockSummary> = rows.iter().map(|(_, s)| s).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print!("{}", render_table(&rows));
            }
        }
    }
    Ok(())
}

fn render_table(rows: &[(&Product, StockSummary)]) -> String {
    use std::fmt::Write as _;

    let mut out = format!(
        "{:<6} {:<32} {:<9} {:>7}  {}\n",
        "ID", "PRODUCT", "POLICY", "STOCK", "REORDER"
    );
    for (product, summary) in rows {
        let status = if product.is_active { "" } else { " (inactive)" };
        let _ = writeln!(
            out,
            "{:<6} {:<32} {:<9} {:>7}  {}",
            product.id,
            format!("{}{status}", product.name),
            summary.size_policy.as_str(),
            summary.total_stock,
            summary.reorder_skus.join(", "),
        );
    }
    out
}
