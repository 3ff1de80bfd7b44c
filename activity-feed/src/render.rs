use crate::types::{ClassifiedEvent, Feed, FeedEntry, Result, TargetDescriptor};
use chrono::{DateTime, Utc};

pub const NO_ACTIVITY: &str = "No activity found";

/// Plain-text rendering of a feed: one section per repository, one line per event.
pub fn render_text(feed: &Feed) -> String {
    feed.entries.iter().map(render_entry).collect::<Vec<_>>().join("\n")
}

pub fn render_json(feed: &Feed) -> Result<String> {
    Ok(serde_json::to_string_pretty(feed)?)
}

pub fn render_entry(entry: &FeedEntry) -> String {
    let mut out = format!("{}\n", entry.repository_full_name);

    if let Some(error) = &entry.error {
        out.push_str(&format!("  Failed to load activity: {error}\n"));
    } else if entry.is_empty {
        out.push_str(&format!("  {NO_ACTIVITY}\n"));
    } else {
        for event in &entry.events {
            out.push_str("  ");
            out.push_str(&render_event(event));
            out.push('\n');
        }
    }

    out
}

pub fn render_event(classified: &ClassifiedEvent) -> String {
    let mut line = format!(
        "{}  {} {}",
        format_timestamp(&classified.event.created_at),
        classified.event.actor.login,
        classified.action.text
    );

    for target in &classified.action.targets {
        match target {
            // separators between wiki pages hug the previous target
            TargetDescriptor::Text { value } if value.trim() == "," => line.push(','),
            TargetDescriptor::Text { value } => {
                line.push(' ');
                line.push_str(value.trim());
            }
            TargetDescriptor::Link { href, label, .. } => {
                line.push_str(&format!(" {label} <{href}>"));
            }
        }
    }

    line
}

/// `2024-03-01 10:00`, or the raw value when it is not RFC 3339.
pub fn format_timestamp(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|t| t.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}
