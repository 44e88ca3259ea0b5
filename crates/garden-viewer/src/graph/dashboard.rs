use garden_core::{
    Centrality, Communities, GraphAnalysis, Link, Node, NodeId, NodeKind, SemanticConnection,
};

use crate::graph::layout::kind_radius;
use crate::graph::model::{GraphModel, ModelStats};

pub const COMMUNITY_PALETTE: [&str; 10] = [
    "#3498db", "#e74c3c", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#d35400", "#34495e",
    "#16a085", "#c0392b",
];

/// One analysis artifact as the dashboards see it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Panel<T> {
    #[default]
    Loading,
    Ready(T),
    /// Fallback text naming what is missing.
    Unavailable(String),
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommunitySummary {
    pub id: String,
    pub size: usize,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedNode {
    pub id: NodeId,
    pub score: f64,
    /// Bar width in percent of the top score.
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub model: ModelStats,
    pub last_updated: Option<String>,
}

#[derive(Debug, Default)]
pub struct Dashboards {
    pub analysis: Panel<GraphAnalysis>,
    pub semantic: Panel<Vec<SemanticConnection>>,
    pub communities: Panel<Communities>,
    pub centrality: Panel<Centrality>,
    pub last_updated: Option<String>,
}

impl Dashboards {
    pub fn set_loading(&mut self) {
        self.analysis = Panel::Loading;
        self.semantic = Panel::Loading;
        self.communities = Panel::Loading;
        self.centrality = Panel::Loading;
    }

    pub fn community_color(&self, node: &Node) -> Option<&'static str> {
        if node.kind != NodeKind::Note {
            return None;
        }
        let c = self.communities.ready()?;
        let group = c.partition.get(node.id.as_str())?;
        Some(COMMUNITY_PALETTE[group % COMMUNITY_PALETTE.len()])
    }

    /// Communities ordered by member count, largest first. Ties keep the
    /// artifact's key order.
    pub fn communities_by_size(&self) -> Vec<CommunitySummary> {
        let Some(c) = self.communities.ready() else {
            return Vec::new();
        };
        let mut out: Vec<CommunitySummary> = c
            .communities
            .iter()
            .map(|(id, members)| CommunitySummary {
                id: id.clone(),
                size: members.len(),
                color: COMMUNITY_PALETTE
                    [id.parse::<usize>().unwrap_or(0) % COMMUNITY_PALETTE.len()],
            })
            .collect();
        out.sort_by(|a, b| b.size.cmp(&a.size));
        out
    }

    pub fn ranked_centrality(&self, limit: usize) -> Vec<RankedNode> {
        let Some(c) = self.centrality.ready() else {
            return Vec::new();
        };
        let mut scores: Vec<(&String, f64)> =
            c.combined_centrality.iter().map(|(k, v)| (k, *v)).collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let max = scores.first().map(|s| s.1).unwrap_or(0.0);
        scores
            .into_iter()
            .take(limit)
            .map(|(id, score)| RankedNode {
                id: NodeId(id.clone()),
                score,
                width: if max > 0.0 { score / max * 100.0 } else { 0.0 },
            })
            .collect()
    }

    /// Note radius scaled by centrality; other kinds keep their fixed size.
    pub fn node_radius(&self, node: &Node) -> f32 {
        let base = kind_radius(node.kind);
        if node.kind != NodeKind::Note {
            return base;
        }
        let Some(c) = self.centrality.ready() else {
            return base;
        };
        let max = c
            .combined_centrality
            .values()
            .copied()
            .fold(0.0_f64, f64::max);
        match c.combined_centrality.get(node.id.as_str()) {
            Some(score) if max > 0.0 => 10.0 + (score / max * 15.0) as f32,
            _ => base,
        }
    }

    pub fn stats(&self, model: &GraphModel) -> GraphStats {
        GraphStats {
            model: model.stats(),
            last_updated: self.last_updated.clone(),
        }
    }
}

/// Merge semantic connections as Semantic links. Pairs already linked, or
/// touching unknown nodes, are skipped. Returns how many were added.
pub fn merge_semantic(model: &mut GraphModel, connections: &[SemanticConnection]) -> usize {
    connections
        .iter()
        .filter(|c| {
            model.merge_link(Link::semantic(
                NodeId::note(&c.source),
                NodeId::note(&c.target),
                c.similarity,
            ))
        })
        .count()
}
