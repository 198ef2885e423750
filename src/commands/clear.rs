// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use super::Context;
use anyhow::Result;
use holocron::resource::EntityKind;

/// Run clear command
pub fn run(ctx: &Context, kind: Option<EntityKind>, yes: bool) -> Result<()> {
    let Some(kind) = kind else {
        if !yes {
            anyhow::bail!("This removes every local edit and preference. Re-run with --yes to confirm.");
        }
        ctx.store().clear_all();
        println!(
            "{} local data in {}",
            ctx.palette.ok("Cleared"),
            ctx.config.data_dir.display()
        );
        return Ok(());
    };

    if !yes {
        anyhow::bail!("This removes every local {kind} edit. Re-run with --yes to confirm.");
    }
    let store = ctx.edit_store();
    let removed = holocron::with_resource!(kind, R => {
        let count = store.get_edits::<R>().len();
        store.clear::<R>();
        count
    });
    println!("{} {} {} edit(s)", ctx.palette.ok("Cleared"), removed, kind);
    Ok(())
}
