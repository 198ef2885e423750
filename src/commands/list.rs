// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List a page of entities

use super::{print_json, Context};
use anyhow::{Context as _, Result};
use holocron::explorer::ListView;
use holocron::fetcher::ListQuery;
use holocron::resource::{EntityKind, Resource};

/// Run list command
pub fn run(ctx: &Context, kind: EntityKind, search: Option<String>, page: Option<u32>) -> Result<()> {
    let query = ListQuery::new(search, page);
    let mut explorer = ctx.explorer()?;

    holocron::with_resource!(kind, R => {
        let view = explorer
            .list::<R>(&query)
            .with_context(|| format!("Failed to list {kind}"))?;
        if ctx.json {
            print_json(&view)
        } else {
            render::<R>(ctx, kind, &query, &view);
            Ok(())
        }
    })
}

fn render<R: Resource>(ctx: &Context, kind: EntityKind, query: &ListQuery, view: &ListView<R>) {
    let info = &view.pagination;

    if view.entities.is_empty() {
        match &query.search {
            Some(term) => println!("No {kind} match '{term}'."),
            None => println!("No {kind} found."),
        }
        return;
    }

    println!(
        "{} (page {} of {}, {} total):",
        ctx.palette.heading(kind.as_str()),
        info.current_page,
        info.total_pages.max(1),
        info.total_count
    );
    for merged in &view.entities {
        let marker = if merged.has_local_edits {
            ctx.palette.edited(" [edited]")
        } else {
            String::new()
        };
        println!("  {:>4}  {}{}", merged.id, merged.display_name(), marker);
    }

    if view.stale {
        println!("{}", ctx.palette.muted("(cached data, the API could not be reached)"));
    }
    if info.has_next {
        let search = query
            .search
            .as_ref()
            .map(|t| format!(" --search '{t}'"))
            .unwrap_or_default();
        println!(
            "{}",
            ctx.palette.muted(&format!(
                "Next: holocron list {kind}{search} --page {}",
                info.current_page + 1
            ))
        );
    }
}
