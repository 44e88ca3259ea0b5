//! HTTP access to the garden index and the analysis artifacts.

use garden_core::{
    Centrality, Communities, GardenIndex, GraphAnalysis, PathsResponse, SemanticConnection,
    Subgraph,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// The independently fetched analysis artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Index,
    Analysis,
    Semantic,
    Communities,
    Centrality,
    Paths,
    Subgraph,
}

impl ArtifactKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Index => "Garden index",
            Self::Analysis => "Graph analysis",
            Self::Semantic => "Semantic connection",
            Self::Communities => "Community",
            Self::Centrality => "Centrality",
            Self::Paths => "Path",
            Self::Subgraph => "Subgraph",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Self::Index => "",
            Self::Analysis => "graph-analysis.json",
            Self::Semantic => "semantic-connections.json",
            Self::Communities => "communities.json",
            Self::Centrality => "centrality.json",
            Self::Paths => "paths.json",
            Self::Subgraph => "subgraph.json",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{artifact:?} request failed: {source}")]
    Transport {
        artifact: ArtifactKind,
        #[source]
        source: reqwest::Error,
    },
    #[error("{artifact:?} returned HTTP {status}")]
    Status {
        artifact: ArtifactKind,
        status: StatusCode,
    },
    #[error("{artifact:?} could not be decoded: {source}")]
    Decode {
        artifact: ArtifactKind,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn artifact(&self) -> ArtifactKind {
        match self {
            Self::Transport { artifact, .. }
            | Self::Status { artifact, .. }
            | Self::Decode { artifact, .. } => *artifact,
        }
    }

    /// Panel text shown in place of the artifact.
    pub fn fallback_message(&self) -> String {
        let label = self.artifact().label();
        match self.artifact() {
            ArtifactKind::Index => {
                "Failed to load the garden index. Make sure the garden has been generated."
                    .to_string()
            }
            ArtifactKind::Paths | ArtifactKind::Subgraph => {
                format!("{label} query failed: {self}")
            }
            ArtifactKind::Analysis => format!(
                "{label} data is not available. Run the knowledge graph analyzer to generate analysis data."
            ),
            _ => format!(
                "{label} data is not available. Run the knowledge graph analyzer to generate it."
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone)]
pub struct GardenApi {
    http: Client,
    index_url: String,
    api_base: String,
}

impl GardenApi {
    pub fn new(index_url: &str, api_base: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                artifact: ArtifactKind::Index,
                source,
            })?;
        Ok(Self {
            http,
            index_url: index_url.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, artifact: ArtifactKind) -> String {
        match artifact {
            ArtifactKind::Index => self.index_url.clone(),
            other => format!("{}/{}", self.api_base, other.endpoint()),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        artifact: ArtifactKind,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(artifact);
        debug!(%url, "fetching {:?}", artifact);

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|source| ApiError::Transport { artifact, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "artifact request rejected");
            return Err(ApiError::Status { artifact, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { artifact, source })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { artifact, source })
    }

    pub async fn index(&self) -> Result<GardenIndex> {
        self.get(ArtifactKind::Index, &[]).await
    }

    pub async fn analysis(&self) -> Result<GraphAnalysis> {
        self.get(ArtifactKind::Analysis, &[]).await
    }

    pub async fn semantic_connections(&self) -> Result<Vec<SemanticConnection>> {
        self.get(ArtifactKind::Semantic, &[]).await
    }

    pub async fn communities(&self) -> Result<Communities> {
        self.get(ArtifactKind::Communities, &[]).await
    }

    pub async fn centrality(&self) -> Result<Centrality> {
        self.get(ArtifactKind::Centrality, &[]).await
    }

    pub async fn paths(&self, source: &str, target: &str) -> Result<Vec<Vec<String>>> {
        let resp: PathsResponse = self
            .get(
                ArtifactKind::Paths,
                &[("source", source.to_string()), ("target", target.to_string())],
            )
            .await?;
        Ok(resp.into_paths())
    }

    pub async fn subgraph(&self, node: &str, distance: u32) -> Result<Subgraph> {
        self.get(
            ArtifactKind::Subgraph,
            &[("node", node.to_string()), ("distance", distance.to_string())],
        )
        .await
    }
}
