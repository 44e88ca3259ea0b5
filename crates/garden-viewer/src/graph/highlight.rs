//! Read-only highlight queries over the current model.
//!
//! Path and subgraph highlighting differ: a path marks
//! its own nodes and links and leaves everything else neutral, a subgraph
//! dims everything outside the set.

use garden_core::NodeId;
use std::collections::{HashMap, HashSet};

use crate::graph::model::GraphModel;

pub const PATH_PALETTE: [&str; 5] = ["#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    #[default]
    Neutral,
    Highlighted {
        color: Option<&'static str>,
    },
    Dimmed,
}

impl Mark {
    pub fn is_highlighted(self) -> bool {
        matches!(self, Mark::Highlighted { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HighlightRequest {
    /// One or more ordered node sequences. With several paths each gets a
    /// palette colour, cycling by index.
    Paths(Vec<Vec<NodeId>>),
    /// Focus on a set of nodes and the links fully inside it.
    Subgraph(HashSet<NodeId>),
    Reset,
}

/// Per-element highlight state. `links` is parallel to `GraphModel::links`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightMap {
    nodes: HashMap<NodeId, Mark>,
    links: Vec<Mark>,
}

impl HighlightMap {
    pub fn neutral(model: &GraphModel) -> Self {
        Self {
            nodes: model.ids().map(|id| (id.clone(), Mark::Neutral)).collect(),
            links: vec![Mark::Neutral; model.link_count()],
        }
    }

    pub fn node(&self, id: &NodeId) -> Mark {
        self.nodes.get(id).copied().unwrap_or_default()
    }

    pub fn link(&self, index: usize) -> Mark {
        self.links.get(index).copied().unwrap_or_default()
    }

    pub fn links(&self) -> &[Mark] {
        &self.links
    }

    pub fn highlighted_nodes(&self) -> usize {
        self.nodes.values().filter(|m| m.is_highlighted()).count()
    }

    pub fn highlighted_links(&self) -> usize {
        self.links.iter().filter(|m| m.is_highlighted()).count()
    }

    pub fn is_neutral(&self) -> bool {
        self.nodes.values().all(|m| *m == Mark::Neutral)
            && self.links.iter().all(|m| *m == Mark::Neutral)
    }
}

pub fn highlight(model: &GraphModel, request: &HighlightRequest) -> HighlightMap {
    match request {
        HighlightRequest::Paths(paths) => highlight_paths(model, paths),
        HighlightRequest::Subgraph(set) => highlight_subgraph(model, set),
        HighlightRequest::Reset => HighlightMap::neutral(model),
    }
}

fn highlight_paths(model: &GraphModel, paths: &[Vec<NodeId>]) -> HighlightMap {
    let mut map = HighlightMap::neutral(model);

    let mut by_pair: HashMap<(NodeId, NodeId), Vec<usize>> = HashMap::new();
    for (i, link) in model.links().iter().enumerate() {
        by_pair.entry(link.pair_key()).or_default().push(i);
    }

    let multi = paths.len() > 1;
    for (pi, path) in paths.iter().enumerate() {
        let mark = Mark::Highlighted {
            color: multi.then(|| PATH_PALETTE[pi % PATH_PALETTE.len()]),
        };
        for id in path {
            if let Some(slot) = map.nodes.get_mut(id) {
                *slot = mark;
            }
        }
        for step in path.windows(2) {
            let key = if step[0] <= step[1] {
                (step[0].clone(), step[1].clone())
            } else {
                (step[1].clone(), step[0].clone())
            };
            for &li in by_pair.get(&key).into_iter().flatten() {
                map.links[li] = mark;
            }
        }
    }
    map
}

fn highlight_subgraph(model: &GraphModel, set: &HashSet<NodeId>) -> HighlightMap {
    let on = Mark::Highlighted { color: None };
    let nodes = model
        .ids()
        .map(|id| {
            let mark = if set.contains(id) { on } else { Mark::Dimmed };
            (id.clone(), mark)
        })
        .collect();
    let links = model
        .links()
        .iter()
        .map(|l| {
            if set.contains(&l.source) && set.contains(&l.target) {
                on
            } else {
                Mark::Dimmed
            }
        })
        .collect();
    HighlightMap { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_core::{Link, LinkKind, Node};

    fn ids(v: &[&str]) -> Vec<NodeId> {
        v.iter().map(|s| NodeId::from(*s)).collect()
    }

    /// A-B stored forwards, C-B stored backwards, plus D-A and D-E off the path.
    fn model() -> GraphModel {
        let mut m = GraphModel::default();
        for id in ["A", "B", "C", "D", "E"] {
            m.merge_node(Node::note(id));
        }
        for (a, b) in [("A", "B"), ("C", "B"), ("D", "A"), ("D", "E")] {
            m.merge_link(Link::new(a.into(), b.into(), LinkKind::Related));
        }
        m
    }

    #[test]
    fn path_marks_members_and_leaves_rest_neutral() {
        let m = model();
        let map = highlight(&m, &HighlightRequest::Paths(vec![ids(&["A", "B", "C"])]));

        for id in ["A", "B", "C"] {
            assert_eq!(map.node(&id.into()), Mark::Highlighted { color: None });
        }
        assert_eq!(map.node(&"D".into()), Mark::Neutral);
        assert_eq!(map.node(&"E".into()), Mark::Neutral);

        assert!(map.link(0).is_highlighted());
        assert!(map.link(1).is_highlighted(), "reverse-stored link matches");
        assert_eq!(map.link(2), Mark::Neutral);
        assert_eq!(map.link(3), Mark::Neutral);
    }

    #[test]
    fn path_does_not_mark_shortcut_links() {
        let mut m = model();
        m.merge_link(Link::new("A".into(), "C".into(), LinkKind::Related));
        let map = highlight(&m, &HighlightRequest::Paths(vec![ids(&["A", "B", "C"])]));
        assert_eq!(map.link(4), Mark::Neutral);
        assert_eq!(map.highlighted_links(), 2);
    }

    #[test]
    fn multiple_paths_cycle_the_palette() {
        let m = model();
        let paths: Vec<Vec<NodeId>> = (0..6).map(|_| ids(&["D", "E"])).collect();
        let map = highlight(&m, &HighlightRequest::Paths(paths));
        // The last path (index 5) wins and wraps to the first colour.
        assert_eq!(
            map.node(&"E".into()),
            Mark::Highlighted {
                color: Some(PATH_PALETTE[0])
            }
        );

        let map = highlight(
            &m,
            &HighlightRequest::Paths(vec![ids(&["A", "B"]), ids(&["D", "E"])]),
        );
        assert_eq!(
            map.node(&"A".into()),
            Mark::Highlighted {
                color: Some(PATH_PALETTE[0])
            }
        );
        assert_eq!(
            map.link(3),
            Mark::Highlighted {
                color: Some(PATH_PALETTE[1])
            }
        );
    }

    #[test]
    fn subgraph_dims_everything_outside() {
        let m = model();
        let set: HashSet<NodeId> = ids(&["A", "B"]).into_iter().collect();
        let map = highlight(&m, &HighlightRequest::Subgraph(set));

        assert!(map.node(&"A".into()).is_highlighted());
        assert!(map.node(&"B".into()).is_highlighted());
        for id in ["C", "D", "E"] {
            assert_eq!(map.node(&id.into()), Mark::Dimmed);
        }
        assert!(map.link(0).is_highlighted());
        assert_eq!(map.link(1), Mark::Dimmed, "C-B crosses the boundary");
        assert_eq!(map.link(2), Mark::Dimmed);
        assert_eq!(map.link(3), Mark::Dimmed);
    }

    #[test]
    fn reset_is_all_neutral() {
        let m = model();
        let map = highlight(&m, &HighlightRequest::Reset);
        assert!(map.is_neutral());
        assert_eq!(map.links().len(), m.link_count());
    }

    #[test]
    fn unknown_identities_are_ignored() {
        let m = model();
        let map = highlight(&m, &HighlightRequest::Paths(vec![ids(&["A", "ghost"])]));
        assert_eq!(map.highlighted_nodes(), 1);
        assert_eq!(map.node(&"ghost".into()), Mark::Neutral);
    }
}
