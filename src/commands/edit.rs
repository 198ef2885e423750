// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Save a local edit

use super::{print_json, Context};
use anyhow::Result;
use holocron::resource::{
    apply_assignment, field_by_key, normalize_id, EntityKind, FieldTag, Patch, Resource,
};
use holocron::validation::validate;

/// Arguments for the edit command
pub struct EditArgs {
    /// `field=value` assignments
    pub set: Vec<String>,
    /// Fields to drop from the edit
    pub unset: Vec<String>,
    /// Start from an empty edit instead of the saved one
    pub replace: bool,
}

/// Run edit command
pub fn run(ctx: &Context, kind: EntityKind, id: &str, args: &EditArgs) -> Result<()> {
    let id = normalize_id(id);
    if id.is_empty() {
        anyhow::bail!("Entity ID is required");
    }
    if args.set.is_empty() && args.unset.is_empty() && !args.replace {
        anyhow::bail!(
            "Nothing to edit. Use 'holocron edit {} {} --set <field>=<value>'",
            kind,
            id
        );
    }

    holocron::with_resource!(kind, R => save::<R>(ctx, &id, args))
}

fn save<R: Resource>(ctx: &Context, id: &str, args: &EditArgs) -> Result<()> {
    let store = ctx.edit_store();

    let mut patch = if args.replace {
        R::Patch::default()
    } else {
        store
            .get_edit::<R>(id)
            .map(|record| record.edited_data)
            .unwrap_or_default()
    };

    for assignment in &args.set {
        apply_assignment::<R>(&mut patch, assignment)?;
    }
    for key in &args.unset {
        patch.unset(field_by_key::<R>(key)?);
    }

    validate::<R>(&patch)?;

    match store.save::<R>(id, patch) {
        Some(record) => {
            if ctx.json {
                return print_json(&record);
            }
            println!("{} {}/{}", ctx.palette.ok("Saved edit for"), R::KIND, id);
            for (field, value) in record.edited_data.overrides() {
                println!("  {}: {}", field.key(), value);
            }
        }
        None => {
            if ctx.json {
                return print_json(&serde_json::Value::Null);
            }
            println!("Edit for {}/{} is empty; removed it.", R::KIND, id);
        }
    }
    Ok(())
}
