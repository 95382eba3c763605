//! Snapshot text format
//!
//! One config serialized as line-oriented text, used for sync transfers
//! and human inspection. Per entry: comment lines, recognized option
//! tags, then the key/value line. Values are kept on one line by
//! escaping backslashes and newlines.
//!
//! ```text
//! # Multi
//! # Comment
//! @reload WORLD
//! @hidden
//! @forced
//! simple-entries.Simple Number = 0
//! ```
//!
//! Parsing is tolerant: unrecognized lines are skipped and option tags
//! without a following key/value line are dropped.

use tracing::trace;

use crate::entry::ReloadMode;

/// One entry of a serialized config snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotRecord {
    /// Dotted entry path.
    pub key: String,
    /// Serialized entry value.
    pub value: String,
    /// Comment lines attached to the entry.
    pub comments: Vec<String>,
    /// Reload requirement tag.
    pub reload: ReloadMode,
    /// Whether the entry is excluded from enumeration.
    pub hidden: bool,
    /// Whether suggestions are the exhaustive legal set.
    pub forced: bool,
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Render records into snapshot text.
pub fn write_snapshot(records: impl IntoIterator<Item = SnapshotRecord>) -> String {
    let mut out = String::new();
    let mut first = true;
    for record in records {
        if !first {
            out.push('\n');
        }
        first = false;
        for comment in &record.comments {
            out.push_str("# ");
            out.push_str(comment);
            out.push('\n');
        }
        if record.reload != ReloadMode::None {
            out.push_str("@reload ");
            out.push_str(record.reload.tag());
            out.push('\n');
        }
        if record.hidden {
            out.push_str("@hidden\n");
        }
        if record.forced {
            out.push_str("@forced\n");
        }
        out.push_str(&record.key);
        out.push_str(" = ");
        out.push_str(&escape_value(&record.value));
        out.push('\n');
    }
    out
}

/// Parse snapshot text back into records.
pub fn parse_snapshot(text: &str) -> Vec<SnapshotRecord> {
    let mut records = Vec::new();
    let mut pending = SnapshotRecord::default();
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix("# ") {
            pending.comments.push(comment.to_string());
        } else if let Some(tag) = trimmed.strip_prefix("@reload") {
            pending.reload = ReloadMode::from_tag(tag);
        } else if trimmed == "@hidden" {
            pending.hidden = true;
        } else if trimmed == "@forced" {
            pending.forced = true;
        } else if let Some((key, value)) = trimmed.split_once(" = ") {
            pending.key = key.to_string();
            pending.value = unescape_value(value);
            records.push(std::mem::take(&mut pending));
        } else {
            trace!(line = trimmed, "skipping unrecognized snapshot line");
        }
    }
    records
}
