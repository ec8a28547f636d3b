//! `parley providers`: effective provider configuration and registration state.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use crate::state::AppState;

pub fn list_providers(state: &AppState, json: bool) -> Result<()> {
    let registry = state.orchestrator.registry();

    if json {
        let providers: Vec<_> = state
            .providers
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "kind": p.id.kind(),
                    "model": p.model,
                    "max_tokens": p.max_tokens,
                    "timeout_secs": p.timeout_secs,
                    "api_key_env": p.api_key_env,
                    "base_url": p.base_url,
                    "configured": registry.contains(p.id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("Providers").bold());
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Provider").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Max Tokens").fg(Color::White),
        Cell::new("Timeout").fg(Color::White),
        Cell::new("Key").fg(Color::White),
        Cell::new("Status").fg(Color::White),
    ]);

    for p in &state.providers {
        let status = if registry.contains(p.id) {
            Cell::new("ready").fg(Color::Green)
        } else {
            Cell::new("no key").fg(Color::Red)
        };
        let max_tokens = if p.max_tokens == 0 {
            "-".to_string()
        } else {
            p.max_tokens.to_string()
        };

        table.add_row(vec![
            Cell::new(format!("{} ({})", p.id.label(), p.id)).fg(Color::Cyan),
            Cell::new(&p.model).fg(Color::DarkGrey),
            Cell::new(max_tokens).fg(Color::White),
            Cell::new(format!("{}s", p.timeout_secs)).fg(Color::White),
            Cell::new(&p.api_key_env).fg(Color::DarkGrey),
            status,
        ]);
    }

    println!("{table}");
    println!();

    let ready = state.providers.iter().filter(|p| registry.contains(p.id)).count();
    println!(
        "  {} of {} provider{} ready. Data directory: {}",
        style(ready).bold(),
        style(state.providers.len()).bold(),
        if state.providers.len() == 1 { "" } else { "s" },
        style(state.data_dir.display()).dim()
    );
    println!();

    Ok(())
}
