//! Time entry envelope and tree flattening.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::EntryError;
use crate::extract::MAX_LEVEL;
use crate::numeric::clamp_or_default;
use crate::timestamp::parse_canonical;

/// Serialized wrapper passed between extraction and flattening.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub entries: Vec<RawEntry>,
}

/// An entry as found in the envelope, possibly carrying nested children.
///
/// Fields are optional so that malformed entries survive parsing and
/// flattening unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    /// Indentation recorded by the extractor. Values that are not numbers
    /// read as absent; numbers are truncated and clamped to `[0, 10]`.
    #[serde(
        default,
        deserialize_with = "lenient_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<u8>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_entries: Vec<RawEntry>,
}

/// A flattened entry annotated with its level and duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub level: usize,
    /// Hours between start and end. Unclamped; may be negative.
    pub duration: f64,
}

impl TimeEntry {
    /// Display name, empty for entries that carried no name.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl Envelope {
    /// Parse an envelope from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, EntryError> {
        serde_json::from_str(json).map_err(|e| {
            debug!("Envelope parse failed: {}", e);
            EntryError::MalformedEnvelope
        })
    }

    /// Serialize the envelope to JSON.
    pub fn to_json(&self) -> Result<String, EntryError> {
        serde_json::to_string(self).map_err(|e| EntryError::Serialize(e.to_string()))
    }

    /// Flatten the envelope's entry tree, starting at depth 0.
    pub fn flatten(&self) -> Vec<TimeEntry> {
        flatten(&self.entries, 0)
    }

    /// Flatten an extracted table.
    ///
    /// Extracted rows are flat and carry their indentation as a recorded
    /// level. Each top-level entry starts at that level, and anything nested
    /// under it follows at depth + 1 as usual.
    pub fn flatten_indented(&self) -> Vec<TimeEntry> {
        self.entries
            .iter()
            .flat_map(|entry| {
                let start = entry.level.map_or(0, usize::from);
                flatten(std::slice::from_ref(entry), start)
            })
            .collect()
    }
}

/// Flatten an entry tree in pre-order.
///
/// Every entry is annotated with its depth and followed by its own
/// sub-entries one level deeper. Recorded levels are not consulted.
pub fn flatten(entries: &[RawEntry], depth: usize) -> Vec<TimeEntry> {
    let mut flat = Vec::new();
    let mut stack: Vec<(&RawEntry, usize)> = entries.iter().rev().map(|e| (e, depth)).collect();

    while let Some((entry, depth)) = stack.pop() {
        flat.push(TimeEntry {
            name: entry.name.clone(),
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            level: depth,
            duration: duration_hours(entry.start_time.as_deref(), entry.end_time.as_deref()),
        });

        stack.extend(entry.sub_entries.iter().rev().map(|child| (child, depth + 1)));
    }

    flat
}

/// Hours between two canonical timestamps; zero if either is missing or unreadable.
pub fn duration_hours(start: Option<&str>, end: Option<&str>) -> f64 {
    let (Some(start), Some(end)) = (start.and_then(parse_canonical), end.and_then(parse_canonical))
    else {
        return 0.0;
    };

    (end - start).num_seconds() as f64 / 3600.0
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .map(|level| clamp_or_default(level.trunc(), 0.0..=f64::from(MAX_LEVEL), 0.0) as u8))
}
