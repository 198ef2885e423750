// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List saved local edits

use super::{print_json, Context};
use anyhow::{Context as _, Result};
use holocron::edits::EditStore;
use holocron::resource::{EntityKind, FieldTag, Patch, Resource};
use holocron::storage::{edits_key, FileBackend};
use serde_json::{Map, Value};

/// Run edits command
pub fn run(ctx: &Context, kind: Option<EntityKind>) -> Result<()> {
    let store = ctx.edit_store();
    let kinds = kind.map_or_else(|| EntityKind::ALL.to_vec(), |k| vec![k]);

    if ctx.json {
        let mut out = Map::new();
        for kind in kinds {
            let value = holocron::with_resource!(kind, R => serde_json::to_value(store.get_edits::<R>()))
                .context("Failed to serialize edits")?;
            out.insert(kind.to_string(), value);
        }
        return print_json(&out);
    }

    let mut total = 0;
    for kind in kinds {
        total += holocron::with_resource!(kind, R => render::<R>(ctx, &store));
    }
    if total == 0 {
        println!("No local edits. Use 'holocron edit <kind> <id> --set <field>=<value>' to create one.");
    }
    Ok(())
}

fn render<R: Resource>(ctx: &Context, store: &EditStore<FileBackend>) -> usize {
    let edits = store.get_edits::<R>();
    if edits.is_empty() {
        // Empty collections are never written, so anything stored is unreadable
        let key = edits_key(R::KIND);
        if store.store().raw(&key).is_some() {
            println!(
                "{}",
                ctx.palette.muted(&format!(
                    "Stored {} edits ({}.json) could not be read and are ignored.",
                    R::KIND,
                    key
                ))
            );
        }
        return 0;
    }

    println!("{} ({}):", ctx.palette.heading(R::KIND.as_str()), edits.len());
    for (id, record) in &edits {
        println!(
            "  {:>4}  {}",
            id,
            ctx.palette.muted(&record.last_modified.format("%Y-%m-%d %H:%M UTC").to_string())
        );
        for (field, value) in record.edited_data.overrides() {
            println!("        {}: {}", field.key(), value);
        }
    }
    edits.len()
}
