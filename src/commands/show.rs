// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Show one entity

use super::{print_json, Context};
use anyhow::{Context as _, Result};
use holocron::explorer::DetailView;
use holocron::format::{format_field, truncate};
use holocron::resource::{EntityKind, FieldTag, Patch, Resource};

/// Values longer than this are cut unless `--full` is given
const PREVIEW_WIDTH: usize = 60;

/// Run show command
pub fn run(ctx: &Context, kind: EntityKind, id: &str, original: bool, full: bool) -> Result<()> {
    let mut explorer = ctx.explorer()?;

    holocron::with_resource!(kind, R => {
        let view = explorer
            .detail::<R>(id)
            .with_context(|| format!("Failed to load {kind}/{id}"))?;
        match (ctx.json, original) {
            (true, true) => print_json(&view.original),
            (true, false) => print_json(&view),
            (false, _) => {
                render::<R>(ctx, &view, original, full);
                Ok(())
            }
        }
    })
}

fn render<R: Resource>(ctx: &Context, view: &DetailView<R>, original: bool, full: bool) {
    let entity = if original {
        &view.original
    } else {
        &view.merged.entity
    };
    let palette = ctx.palette;

    let mut title = palette.heading(entity.display_name());
    if view.merged.has_local_edits && !original {
        title.push_str(&palette.edited(" [edited]"));
    }
    println!("{title}");
    println!("  {:<18} {}", "ID:", view.merged.id);

    let shown = |value: String| if full { value } else { truncate(&value, PREVIEW_WIDTH) };

    for &field in R::Field::ALL {
        let value = shown(format_field(R::KIND, field.key(), &entity.value(field)));
        let overridden = !original
            && view
                .edit
                .as_ref()
                .is_some_and(|edit| edit.edited_data.is_present(field));
        let label = format!("{}:", field.label());
        if overridden {
            let was = shown(format_field(R::KIND, field.key(), &view.original.value(field)));
            println!(
                "  {:<18} {} {}",
                label,
                palette.edited(&value),
                palette.muted(&format!("(was {was})"))
            );
        } else {
            println!("  {label:<18} {value}");
        }
    }

    println!("  {:<18} {}", "URL:", entity.url());
    if let (Some(edit), false) = (&view.edit, original) {
        println!(
            "{}",
            palette.muted(&format!(
                "Edited locally {}. Use 'holocron restore {} {}' to discard.",
                edit.last_modified.format("%Y-%m-%d %H:%M UTC"),
                R::KIND,
                view.merged.id
            ))
        );
    }
    if view.stale {
        println!("{}", palette.muted("(cached data, the API could not be reached)"));
    }
}
