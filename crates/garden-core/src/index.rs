use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoteEntry {
    pub path: Option<String>,
    pub tags: Vec<String>,
    pub created: Option<String>,
    pub related_notes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathEntry {
    pub subtopics: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexMetadata {
    pub last_updated: Option<String>,
    pub version: Option<String>,
}

/// Full garden snapshot as published in `index.json`.
///
/// A freshly bootstrapped garden writes `notes`, `tags` and `paths` as
/// empty arrays and keeps the timestamp under `metadata`; both shapes
/// decode to the same value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GardenIndex {
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub notes: BTreeMap<String, NoteEntry>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(
        default,
        deserialize_with = "opt_map_or_empty_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub paths: Option<BTreeMap<String, PathEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IndexMetadata>,
}

impl GardenIndex {
    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated
            .as_deref()
            .or_else(|| self.metadata.as_ref()?.last_updated.as_deref())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MapOrList<T> {
    Map(BTreeMap<String, T>),
    List(Vec<serde_json::Value>),
}

fn map_or_empty_list<'de, D, T>(d: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match MapOrList::<T>::deserialize(d)? {
        MapOrList::Map(m) => m,
        MapOrList::List(_) => BTreeMap::new(),
    })
}

fn opt_map_or_empty_list<'de, D, T>(d: D) -> Result<Option<BTreeMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<MapOrList<T>>::deserialize(d)? {
        Some(MapOrList::Map(m)) => Some(m),
        Some(MapOrList::List(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_populated_index() {
        let raw = r#"{
            "notes": {
                "Rust": {"path": "notes/rust.md", "tags": ["lang"], "created": "2024-01-01T00:00:00", "related_notes": ["Cargo"]},
                "Cargo": {"path": "notes/cargo.md", "tags": [], "created": "2024-01-02T00:00:00", "related_notes": []}
            },
            "tags": {"lang": ["Rust"]},
            "paths": {"Systems": {"subtopics": ["memory", "threads"]}},
            "last_updated": "2024-01-03T00:00:00"
        }"#;
        let idx: GardenIndex = serde_json::from_str(raw).unwrap();
        assert_eq!(idx.notes.len(), 2);
        assert_eq!(idx.notes["Rust"].related_notes, vec!["Cargo".to_string()]);
        assert_eq!(idx.tags["lang"], vec!["Rust".to_string()]);
        assert_eq!(idx.paths.as_ref().unwrap()["Systems"].subtopics.len(), 2);
        assert_eq!(idx.last_updated(), Some("2024-01-03T00:00:00"));
    }

    #[test]
    fn decodes_bootstrap_index_with_empty_lists() {
        let raw = r#"{
            "notes": [],
            "tags": [],
            "paths": [],
            "metadata": {"last_updated": "2024-05-01 10:00:00", "version": "1.0.0"}
        }"#;
        let idx: GardenIndex = serde_json::from_str(raw).unwrap();
        assert!(idx.notes.is_empty());
        assert!(idx.tags.is_empty());
        assert!(idx.paths.is_none());
        assert_eq!(idx.last_updated(), Some("2024-05-01 10:00:00"));
    }

    #[test]
    fn missing_paths_is_none() {
        let idx: GardenIndex = serde_json::from_str(r#"{"notes": {}, "tags": {}}"#).unwrap();
        assert!(idx.paths.is_none());
        assert!(idx.last_updated().is_none());
    }
}
