use serde::{Deserialize, Serialize};

pub mod analysis;
pub mod index;
pub mod live;

pub use analysis::{
    Centrality, Communities, GraphAnalysis, PathsResponse, SemanticConnection, Subgraph,
    SubgraphEdge,
};
pub use index::{GardenIndex, NoteEntry, PathEntry};
pub use live::{ClientMsg, ServerMsg, ToolUsage};

pub const TAG_PREFIX: &str = "tag:";
pub const PATH_PREFIX: &str = "path:";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn note(title: &str) -> Self {
        Self(title.to_string())
    }

    pub fn tag(name: &str) -> Self {
        Self(format!("{TAG_PREFIX}{name}"))
    }

    pub fn path(topic: &str) -> Self {
        Self(format!("{PATH_PREFIX}{topic}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Note,
    Tag,
    Path,
}

/// Detail-pane data carried along with a node. Never consulted by the
/// model or layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeMeta {
    pub tags: Vec<String>,
    pub created: Option<String>,
    pub subtopics: Vec<String>,
    pub source_path: Option<String>,
    pub related_notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub title: String,
    #[serde(default)]
    pub meta: NodeMeta,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            meta: NodeMeta::default(),
        }
    }

    pub fn note(title: &str) -> Self {
        Self::new(NodeId::note(title), NodeKind::Note, title)
    }

    pub fn tag(name: &str) -> Self {
        Self::new(NodeId::tag(name), NodeKind::Tag, name)
    }

    pub fn path(topic: &str) -> Self {
        Self::new(NodeId::path(topic), NodeKind::Path, topic)
    }

    pub fn with_meta(mut self, meta: NodeMeta) -> Self {
        self.meta = meta;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Related,
    Tagged,
    #[serde(rename = "path")]
    PathMembership,
    Semantic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Link {
    pub fn new(source: NodeId, target: NodeId, kind: LinkKind) -> Self {
        Self {
            source,
            target,
            kind,
            weight: None,
        }
    }

    pub fn semantic(source: NodeId, target: NodeId, similarity: f64) -> Self {
        Self {
            source,
            target,
            kind: LinkKind::Semantic,
            weight: Some(similarity),
        }
    }

    /// True when this link joins `a` and `b`, in either direction.
    pub fn connects(&self, a: &NodeId, b: &NodeId) -> bool {
        (self.source == *a && self.target == *b) || (self.source == *b && self.target == *a)
    }

    /// Endpoints ordered so that `a-b` and `b-a` share a key.
    pub fn pair_key(&self) -> (NodeId, NodeId) {
        if self.source <= self.target {
            (self.source.clone(), self.target.clone())
        } else {
            (self.target.clone(), self.source.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_are_namespaced_by_prefix() {
        assert_eq!(NodeId::note("Rust").0, "Rust");
        assert_eq!(NodeId::tag("rust").0, "tag:rust");
        assert_eq!(NodeId::path("Rust").0, "path:Rust");
    }

    #[test]
    fn pair_key_ignores_direction() {
        let ab = Link::new("a".into(), "b".into(), LinkKind::Related);
        let ba = Link::new("b".into(), "a".into(), LinkKind::Semantic);
        assert_eq!(ab.pair_key(), ba.pair_key());
        assert!(ba.connects(&"a".into(), &"b".into()));
        assert!(!ba.connects(&"a".into(), &"c".into()));
    }

    #[test]
    fn link_kind_uses_wire_names() {
        let s = serde_json::to_string(&LinkKind::PathMembership).unwrap();
        assert_eq!(s, "\"path\"");
        let k: LinkKind = serde_json::from_str("\"semantic\"").unwrap();
        assert_eq!(k, LinkKind::Semantic);
    }
}
