// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use super::Context;
use anyhow::Result;
use holocron::resource::{normalize_id, EntityKind};

/// Run restore command
pub fn run(ctx: &Context, kind: EntityKind, id: &str) -> Result<()> {
    let store = ctx.edit_store();
    let id = &normalize_id(id);

    let existed = holocron::with_resource!(kind, R => {
        let existed = store.get_edit::<R>(id).is_some();
        store.remove_edit::<R>(id);
        existed
    });

    if existed {
        println!("{} {}/{} to the API values", ctx.palette.ok("Restored"), kind, id);
    } else {
        println!("No local edit for {kind}/{id}.");
    }
    Ok(())
}
