use garden_core::NodeId;
use thiserror::Error;

use crate::graph::model::GraphModel;

pub const DEFAULT_SUBGRAPH_DISTANCE: u32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Please enter both source and target node titles.")]
    MissingEndpoints,
    #[error("Please enter a node title.")]
    MissingCenter,
    #[error("Source node \"{0}\" not found.")]
    UnknownSource(String),
    #[error("Target node \"{0}\" not found.")]
    UnknownTarget(String),
    #[error("Node \"{0}\" not found.")]
    UnknownCenter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgraphQuery {
    pub center: NodeId,
    pub distance: u32,
}

/// Resolve two user-entered titles to identities before any request goes out.
pub fn resolve_path_query(
    model: &GraphModel,
    source: &str,
    target: &str,
) -> Result<PathQuery, QueryError> {
    let (source, target) = (source.trim(), target.trim());
    if source.is_empty() || target.is_empty() {
        return Err(QueryError::MissingEndpoints);
    }
    let s = model
        .find_by_title(source)
        .ok_or_else(|| QueryError::UnknownSource(source.to_string()))?;
    let t = model
        .find_by_title(target)
        .ok_or_else(|| QueryError::UnknownTarget(target.to_string()))?;
    Ok(PathQuery {
        source: s.id.clone(),
        target: t.id.clone(),
    })
}

pub fn resolve_subgraph_query(
    model: &GraphModel,
    center: &str,
    distance: Option<u32>,
) -> Result<SubgraphQuery, QueryError> {
    let center = center.trim();
    if center.is_empty() {
        return Err(QueryError::MissingCenter);
    }
    let node = model
        .find_by_title(center)
        .ok_or_else(|| QueryError::UnknownCenter(center.to_string()))?;
    Ok(SubgraphQuery {
        center: node.id.clone(),
        distance: distance.unwrap_or(DEFAULT_SUBGRAPH_DISTANCE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_core::Node;

    fn model() -> GraphModel {
        let mut m = GraphModel::default();
        m.merge_node(Node::note("Memory Safety"));
        m.merge_node(Node::note("Ownership"));
        m
    }

    #[test]
    fn path_query_resolves_titles_case_insensitively() {
        let q = resolve_path_query(&model(), " memory safety ", "OWNERSHIP").expect("resolve");
        assert_eq!(q.source, NodeId::from("Memory Safety"));
        assert_eq!(q.target, NodeId::from("Ownership"));
    }

    #[test]
    fn path_query_rejects_blank_and_unknown() {
        let m = model();
        assert_eq!(
            resolve_path_query(&m, "", "Ownership"),
            Err(QueryError::MissingEndpoints)
        );
        let err = resolve_path_query(&m, "Nope", "Ownership").unwrap_err();
        assert_eq!(err.to_string(), "Source node \"Nope\" not found.");
        let err = resolve_path_query(&m, "Ownership", "Nope").unwrap_err();
        assert_eq!(err, QueryError::UnknownTarget("Nope".into()));
    }

    #[test]
    fn subgraph_query_defaults_distance() {
        let m = model();
        let q = resolve_subgraph_query(&m, "ownership", None).expect("resolve");
        assert_eq!(q.distance, DEFAULT_SUBGRAPH_DISTANCE);
        assert_eq!(
            resolve_subgraph_query(&m, "  ", Some(1)),
            Err(QueryError::MissingCenter)
        );
    }
}
