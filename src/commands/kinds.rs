// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List entity kinds

use super::{print_json, Context};
use anyhow::Result;
use holocron::resource::{EntityKind, FieldTag, Resource};
use serde::Serialize;

#[derive(Serialize)]
struct KindInfo {
    kind: EntityKind,
    endpoint: &'static str,
    searchable: bool,
    editable: Vec<&'static str>,
}

fn editable_keys<R: Resource>() -> Vec<&'static str> {
    R::Field::ALL.iter().map(|f| f.key()).collect()
}

/// Run kinds command
pub fn run(ctx: &Context) -> Result<()> {
    let kinds: Vec<KindInfo> = EntityKind::ALL
        .iter()
        .map(|&kind| KindInfo {
            kind,
            endpoint: kind.endpoint(),
            searchable: kind.searchable(),
            editable: holocron::with_resource!(kind, R => editable_keys::<R>()),
        })
        .collect();

    if ctx.json {
        return print_json(&kinds);
    }

    println!("Entity kinds ({}):", kinds.len());
    for info in &kinds {
        let search = if info.searchable { "" } else { " (no search)" };
        println!(
            "  {:<10} {}{}",
            ctx.palette.heading(info.kind.as_str()),
            info.endpoint,
            ctx.palette.muted(search)
        );
        println!("    editable: {}", info.editable.join(", "));
    }
    Ok(())
}
