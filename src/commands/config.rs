// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use super::Context;
use anyhow::Result;

/// Run config command: print one setting, or the whole effective config
pub fn run(ctx: &Context, key: Option<&str>) -> Result<()> {
    match key {
        Some(key) => match ctx.config.get(key) {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("Unknown config key: {}", key),
        },
        None => print!("{}", ctx.config.to_toml()?),
    }
    Ok(())
}
