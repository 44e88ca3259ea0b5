use garden_core::{Link, LinkKind, Node, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which links count as duplicates of one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDedup {
    /// Same unordered endpoint pair, whatever the kind.
    #[default]
    Endpoints,
    /// Same unordered endpoint pair and same kind.
    EndpointsAndKind,
}

type LinkKey = (NodeId, NodeId, Option<LinkKind>);

/// Identities present before and after a `replace_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub retained: Vec<NodeId>,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub notes: usize,
    pub tags: usize,
    pub paths: usize,
    pub connections: usize,
}

/// Canonical node/link collections.
///
/// Nodes keep insertion order so title lookups resolve to the first match.
/// Links are stored once per dedup key and only when both endpoints exist.
#[derive(Debug, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    links: Vec<Link>,
    link_keys: HashSet<LinkKey>,
    dedup: LinkDedup,
}

impl GraphModel {
    pub fn new(dedup: LinkDedup) -> Self {
        Self {
            dedup,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.links.clear();
        self.link_keys.clear();
    }

    /// Swap in a whole new snapshot. Nodes and links go through the same
    /// identity and dedup rules as the incremental merges.
    pub fn replace_all(&mut self, nodes: Vec<Node>, links: Vec<Link>) -> ReplaceSummary {
        let before: HashSet<NodeId> = self.index.keys().cloned().collect();
        self.clear();

        for node in nodes {
            self.merge_node(node);
        }
        for link in links {
            self.merge_link(link);
        }

        let mut summary = ReplaceSummary::default();
        for node in &self.nodes {
            if before.contains(&node.id) {
                summary.retained.push(node.id.clone());
            } else {
                summary.added.push(node.id.clone());
            }
        }
        let mut removed: Vec<NodeId> = before
            .into_iter()
            .filter(|id| !self.index.contains_key(id))
            .collect();
        removed.sort();
        summary.removed = removed;
        summary
    }

    /// Insert `node` unless its identity is already taken. Existing nodes are
    /// never overwritten.
    pub fn merge_node(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Insert `link` if both endpoints exist and no duplicate is stored.
    pub fn merge_link(&mut self, link: Link) -> bool {
        if !self.index.contains_key(&link.source) || !self.index.contains_key(&link.target) {
            return false;
        }
        let key = self.key_for(&link);
        if !self.link_keys.insert(key) {
            return false;
        }
        self.links.push(link);
        true
    }

    fn key_for(&self, link: &Link) -> LinkKey {
        let (a, b) = link.pair_key();
        let kind = match self.dedup {
            LinkDedup::Endpoints => None,
            LinkDedup::EndpointsAndKind => Some(link.kind),
        };
        (a, b, kind)
    }

    /// Case-insensitive exact match on the display title.
    pub fn find_by_title(&self, title: &str) -> Option<&Node> {
        let wanted = title.to_lowercase();
        self.nodes.iter().find(|n| n.title.to_lowercase() == wanted)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn neighbors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for l in &self.links {
            if &l.source == id {
                out.push(l.target.clone());
            } else if &l.target == id {
                out.push(l.source.clone());
            }
        }
        out
    }

    pub fn stats(&self) -> ModelStats {
        let mut s = ModelStats {
            connections: self.links.len(),
            ..ModelStats::default()
        };
        for n in &self.nodes {
            match n.kind {
                NodeKind::Note => s.notes += 1,
                NodeKind::Tag => s.tags += 1,
                NodeKind::Path => s.paths += 1,
            }
        }
        s
    }
}
