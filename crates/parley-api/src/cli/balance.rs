//! `parley balance`: per-provider usage totals from the ledger store.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use parley_infra::llm::pricing::format_cost;
use parley_types::usage::UsageSummary;

use crate::state::AppState;

pub async fn balance(state: &AppState, json: bool) -> Result<()> {
    let summaries = state.usage().summary().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!();
    if summaries.is_empty() {
        println!("  {} No usage recorded yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    println!("  {}", style("Usage").bold());
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Provider").fg(Color::White),
        Cell::new("Calls").fg(Color::White),
        Cell::new("Input").fg(Color::White),
        Cell::new("Output").fg(Color::White),
        Cell::new("Total").fg(Color::White),
        Cell::new("Est. Cost").fg(Color::White),
    ]);

    for s in &summaries {
        table.add_row(vec![
            Cell::new(s.provider.label()).fg(Color::Cyan),
            Cell::new(s.calls).fg(Color::White),
            Cell::new(format_tokens(s.input_tokens)).fg(Color::DarkGrey),
            Cell::new(format_tokens(s.output_tokens)).fg(Color::DarkGrey),
            Cell::new(format_tokens(s.total_tokens())).fg(Color::White),
            Cell::new(format_cost(s.total_cost)).fg(Color::Yellow),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  Total: {} across {} call{}",
        style(format_cost(total_cost(&summaries))).bold(),
        style(total_calls(&summaries)).bold(),
        if total_calls(&summaries) == 1 { "" } else { "s" }
    );
    println!(
        "  {}",
        style("Costs are estimates from a static rate table.").dim()
    );
    println!();

    Ok(())
}

fn total_cost(summaries: &[UsageSummary]) -> f64 {
    summaries.iter().map(|s| s.total_cost).sum()
}

fn total_calls(summaries: &[UsageSummary]) -> u64 {
    summaries.iter().map(|s| s.calls).sum()
}

/// Format a token count with K/M suffixes.
fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
