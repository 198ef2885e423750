// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Theme and search history commands

use super::{print_json, Context};
use anyhow::Result;
use holocron::preferences::Theme;

/// Run theme command: show the saved theme, or save `theme`
pub fn run_theme(ctx: &Context, theme: Option<Theme>) -> Result<()> {
    let prefs = ctx.preferences();

    if let Some(theme) = theme {
        prefs.set_theme(theme);
        println!("{} theme: {}", ctx.palette.ok("Saved"), theme);
        return Ok(());
    }

    match prefs.theme() {
        Some(theme) if ctx.json => print_json(&theme)?,
        Some(theme) => println!("{theme}"),
        None if ctx.json => print_json(&serde_json::Value::Null)?,
        None => println!("No theme saved. Use 'holocron theme <light|dark>' to set one."),
    }
    Ok(())
}

/// Run history command: show recent searches, or forget them
pub fn run_history(ctx: &Context, clear: bool) -> Result<()> {
    let prefs = ctx.preferences();

    if clear {
        prefs.clear_search_history();
        println!("{} search history", ctx.palette.ok("Cleared"));
        return Ok(());
    }

    let history = prefs.search_history();
    if ctx.json {
        return print_json(&history);
    }
    if history.is_empty() {
        println!("No searches yet. Use 'holocron list <kind> --search <term>'.");
        return Ok(());
    }

    println!("Recent searches ({}):", history.len());
    for term in &history {
        println!("  {term}");
    }
    Ok(())
}
