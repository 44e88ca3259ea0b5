use garden_core::{
    Centrality, Communities, GardenIndex, GraphAnalysis, SemanticConnection, ServerMsg, Subgraph,
};
use std::time::Duration;

use crate::net::api::ArtifactKind;
use crate::net::live::ChannelState;

/// Everything that reaches the event thread, from the live channel or
/// from finished HTTP fetches.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub source: String,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone)]
pub enum IncomingKind {
    Channel(ChannelState),
    Reconnecting { attempt: u32, delay: Duration },
    Server(ServerMsg),
    Snapshot(GardenIndex),
    Artifact(Artifact),
    Paths(Vec<Vec<String>>),
    Subgraph(Subgraph),
    Failed { artifact: ArtifactKind, message: String },
    Error(String),
}

#[derive(Debug, Clone)]
pub enum Artifact {
    Analysis(GraphAnalysis),
    Semantic(Vec<SemanticConnection>),
    Communities(Communities),
    Centrality(Centrality),
}

impl Incoming {
    pub fn channel(source: String, state: ChannelState) -> Self {
        Self {
            source,
            kind: IncomingKind::Channel(state),
        }
    }

    pub fn reconnecting(source: String, attempt: u32, delay: Duration) -> Self {
        Self {
            source,
            kind: IncomingKind::Reconnecting { attempt, delay },
        }
    }

    pub fn server(source: String, msg: ServerMsg) -> Self {
        Self {
            source,
            kind: IncomingKind::Server(msg),
        }
    }

    pub fn snapshot(source: String, index: GardenIndex) -> Self {
        Self {
            source,
            kind: IncomingKind::Snapshot(index),
        }
    }

    pub fn artifact(source: String, artifact: Artifact) -> Self {
        Self {
            source,
            kind: IncomingKind::Artifact(artifact),
        }
    }

    pub fn paths(source: String, paths: Vec<Vec<String>>) -> Self {
        Self {
            source,
            kind: IncomingKind::Paths(paths),
        }
    }

    pub fn subgraph(source: String, subgraph: Subgraph) -> Self {
        Self {
            source,
            kind: IncomingKind::Subgraph(subgraph),
        }
    }

    pub fn failed(source: String, artifact: ArtifactKind, message: String) -> Self {
        Self {
            source,
            kind: IncomingKind::Failed { artifact, message },
        }
    }

    pub fn error(source: String, msg: String) -> Self {
        Self {
            source,
            kind: IncomingKind::Error(msg),
        }
    }
}
