//! Plain-text views of controller snapshots.

use std::fmt::Write as _;

use client_core::SessionSnapshot;
use shared::domain::ResultItem;

const UNTITLED: &str = "Image";

pub fn render_list(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    let Some(term) = snapshot.active_term.as_deref() else {
        out.push_str("No search yet. Type `search <term>` to begin.\n");
        return out;
    };

    let _ = writeln!(
        out,
        "Results for \"{term}\" (sort: {}, page {})",
        snapshot.active_sort, snapshot.active_page
    );
    if snapshot.items.is_empty() && !snapshot.is_loading && snapshot.last_error.is_none() {
        out.push_str("  no images found\n");
    }
    for (index, item) in snapshot.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}. {} by {}",
            index + 1,
            item.display_text.as_deref().unwrap_or(UNTITLED),
            item.attribution
        );
    }
    out.push_str(&render_status(snapshot));
    out
}

pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    if snapshot.is_loading {
        out.push_str("Loading...\n");
    }
    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out, "Error: {error}");
    }
    if !snapshot.is_loading && snapshot.has_more {
        out.push_str("More results available: type `more`.\n");
    }
    out
}

/// Detail view of a single result.
pub fn render_detail(item: &ResultItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", item.id, item.image_ref);
    if let Some(text) = &item.display_text {
        let _ = writeln!(out, "{text}");
    }
    let _ = writeln!(out, "By: {}", item.attribution);
    match item.created_at {
        Some(created_at) => {
            let _ = writeln!(out, "Published on: {}", created_at.format("%Y-%m-%d"));
        }
        None => out.push_str("Published on: unknown\n"),
    }
    match item.like_count {
        Some(likes) => {
            let _ = writeln!(out, "Likes: {likes}");
        }
        None => out.push_str("Likes: unknown\n"),
    }
    out
}
