//! Precomputed analysis artifacts served next to the garden index.
//!
//! All of these are produced by the external analyzer; the client only
//! decodes them. Fields the analyzer may omit are optional or defaulted so
//! that a partially written artifact still decodes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphProperties {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub density: f64,
    pub is_connected: bool,
    pub num_connected_components: usize,
    pub average_clustering: f64,
    pub average_shortest_path_length: Option<f64>,
    pub diameter: Option<usize>,
    pub largest_component_size: Option<usize>,
    pub largest_component_avg_path_length: Option<f64>,
    pub largest_component_diameter: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommunityStructure {
    pub num_communities: usize,
    pub modularity: f64,
    pub largest_community_size: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HierarchicalStructure {
    pub max_core: usize,
    pub core_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DegreeDistribution {
    pub avg_degree: f64,
    pub max_degree: usize,
    pub is_power_law: bool,
    pub alpha: Option<f64>,
}

/// `graph-analysis.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphAnalysis {
    pub graph_properties: GraphProperties,
    pub community_structure: CommunityStructure,
    pub hierarchical_structure: HierarchicalStructure,
    pub degree_distribution: DegreeDistribution,
    pub top_central_nodes: Vec<(String, f64)>,
}

/// One entry of `semantic-connections.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemanticConnection {
    pub source: String,
    pub target: String,
    pub similarity: f64,
}

/// `communities.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Communities {
    pub num_communities: usize,
    pub modularity: f64,
    pub communities: BTreeMap<String, Vec<String>>,
    pub partition: HashMap<String, usize>,
}

/// `centrality.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Centrality {
    pub combined_centrality: HashMap<String, f64>,
}

/// Path query result: either a bare list of paths or `{"paths": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PathsResponse {
    Bare(Vec<Vec<String>>),
    Wrapped { paths: Vec<Vec<String>> },
}

impl PathsResponse {
    pub fn into_paths(self) -> Vec<Vec<String>> {
        match self {
            Self::Bare(p) | Self::Wrapped { paths: p } => p,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubgraphEdge {
    pub source: String,
    pub target: String,
}

/// k-hop subgraph around a center node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Subgraph {
    pub nodes: Vec<String>,
    #[serde(alias = "links")]
    pub edges: Vec<SubgraphEdge>,
}
