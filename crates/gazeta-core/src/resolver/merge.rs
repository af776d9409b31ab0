//! Cross-tier record merging
//!
//! When a slug matches a hot listing stub and an archived full record, the
//! archive record is authoritative for content. The stub only contributes
//! fields the archive record is missing; a non-empty archive field is never
//! overwritten by the stub.

use crate::item::Item;

/// Merge a hot listing stub into an archived record.
pub fn merge_records(mut archive: Item, stub: &Item) -> Item {
    if archive.slug.trim().is_empty() && !stub.slug.trim().is_empty() {
        archive.slug = stub.slug.clone();
    }

    fill(&mut archive.title, &stub.title);
    fill(&mut archive.excerpt, &stub.excerpt);
    fill(&mut archive.body, &stub.body);
    fill(&mut archive.cover, &stub.cover);
    fill(&mut archive.category, &stub.category);
    fill(&mut archive.subcategory, &stub.subcategory);
    fill(&mut archive.category_slug, &stub.category_slug);
    fill(&mut archive.date, &stub.date);
    fill(&mut archive.source, &stub.source);
    fill(&mut archive.canonical, &stub.canonical);
    fill(&mut archive.url, &stub.url);

    for (key, value) in &stub.extra {
        archive
            .extra
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
    archive
}

fn fill(target: &mut Option<String>, from: &Option<String>) {
    let empty = target.as_deref().is_none_or(|s| s.trim().is_empty());
    if empty {
        if let Some(value) = from.as_deref() {
            if !value.trim().is_empty() {
                *target = Some(value.to_string());
            }
        }
    }
}
