//! `parley modes`: list the chat modes loaded from the mode file.

use anyhow::Result;
use console::style;

use parley_core::mode::RESET_NAMES;
use parley_infra::config::modes_path;

use crate::state::AppState;

pub fn list_modes(state: &AppState, json: bool) -> Result<()> {
    if json {
        let modes: Vec<_> = state
            .modes
            .definitions()
            .map(|m| serde_json::json!({ "name": m.name, "instruction": m.instruction }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&modes)?);
        return Ok(());
    }

    println!();
    if state.modes.is_empty() {
        println!(
            "  {} No chat modes defined. Add them to {}.",
            style("i").blue().bold(),
            style(modes_path(&state.data_dir, &state.config).display()).cyan()
        );
        println!();
        return Ok(());
    }

    println!("  {}", style("Chat Modes").bold());
    println!();
    for mode in state.modes.definitions() {
        println!(
            "  {}  {}",
            style(format!("{:<16}", mode.name)).cyan(),
            style(truncate(&mode.instruction, 60)).dim()
        );
    }
    println!();
    println!(
        "  Use {} to apply one, {} to clear it.",
        style("--mode <name>").cyan(),
        style(format!("--mode {}", RESET_NAMES[0])).cyan()
    );
    println!();

    Ok(())
}

/// Shorten to `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 60), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }
}
