//! The single owner of all mutable viewer state.
//!
//! Everything that changes the model goes through [`GardenState::apply`],
//! which keeps the layout in step with the model before returning.

use crossbeam_channel::Receiver;
use garden_core::{GardenIndex, NodeId, ServerMsg, ToolUsage};
use glam::Vec2;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::app::events::{GardenEvent, Subscribers};
use crate::graph::activity::{ActivityLog, Transients};
use crate::graph::build::build_graph;
use crate::graph::dashboard::{merge_semantic, Dashboards, Panel};
use crate::graph::highlight::{highlight, HighlightMap, HighlightRequest};
use crate::graph::layout::LayoutAdapter;
use crate::graph::model::GraphModel;
use crate::graph::query::{self, PathQuery, QueryError, SubgraphQuery};
use crate::net::api::ArtifactKind;
use crate::net::live::ChannelState;
use crate::net::{Artifact, Incoming, IncomingKind};
use crate::util::config::ViewerConfig;

/// Work the event loop runs off-thread; results come back as `Incoming`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ReloadSnapshot,
    ReloadAnalysis,
    FindPaths(PathQuery),
    FetchSubgraph(SubgraphQuery),
}

pub struct GardenState {
    pub model: GraphModel,
    pub layout: LayoutAdapter,
    pub highlight: HighlightMap,
    pub dashboards: Dashboards,
    pub activity: ActivityLog,
    pub transients: Transients,
    pub channel: ChannelState,
    /// Outcome of the last path or subgraph query, for the explorer panel.
    pub query_status: Option<String>,
    paused: bool,
    notification_ttl: Duration,
    pulse_ttl: Duration,
    subscribers: Subscribers,
}

impl GardenState {
    pub fn new(cfg: &ViewerConfig) -> Self {
        Self {
            model: GraphModel::new(cfg.link_dedup),
            layout: LayoutAdapter::new(cfg.layout(), cfg.width, cfg.height),
            highlight: HighlightMap::default(),
            dashboards: Dashboards::default(),
            activity: ActivityLog::new(cfg.activity_log_max),
            transients: Transients::default(),
            channel: ChannelState::Connecting,
            query_status: None,
            paused: false,
            notification_ttl: cfg.notification_ttl(),
            pulse_ttl: cfg.pulse_ttl(),
            subscribers: Subscribers::default(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<GardenEvent> {
        self.subscribers.subscribe()
    }

    /// Fetches to issue once at startup.
    pub fn initial_commands(&mut self) -> Vec<Command> {
        self.dashboards.set_loading();
        vec![Command::ReloadSnapshot, Command::ReloadAnalysis]
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn apply(&mut self, inc: Incoming) -> Vec<Command> {
        self.apply_at(inc, Instant::now())
    }

    pub fn apply_at(&mut self, inc: Incoming, now: Instant) -> Vec<Command> {
        match inc.kind {
            IncomingKind::Channel(state) => {
                self.set_channel(state);
                Vec::new()
            }
            IncomingKind::Reconnecting { attempt, .. } => {
                self.log(format!("Connection lost. Reconnecting (attempt {attempt})..."));
                Vec::new()
            }
            IncomingKind::Server(msg) => self.on_server(msg, now),
            IncomingKind::Snapshot(index) => {
                self.apply_snapshot(&index);
                Vec::new()
            }
            IncomingKind::Artifact(artifact) => {
                self.apply_artifact(artifact);
                Vec::new()
            }
            IncomingKind::Paths(paths) => {
                self.show_paths(paths);
                Vec::new()
            }
            IncomingKind::Subgraph(sub) => {
                self.show_subgraph(sub.nodes);
                Vec::new()
            }
            IncomingKind::Failed { artifact, message } => {
                self.on_failed(artifact, message);
                Vec::new()
            }
            IncomingKind::Error(e) => {
                warn!(source = %inc.source, "{e}");
                Vec::new()
            }
        }
    }

    fn set_channel(&mut self, state: ChannelState) {
        if self.channel == state {
            return;
        }
        self.channel = state;
        if state == ChannelState::GaveUp {
            self.log("Connection lost. Use reset to reconnect.");
        }
        self.subscribers.publish(GardenEvent::ChannelState(state));
    }

    fn on_server(&mut self, msg: ServerMsg, now: Instant) -> Vec<Command> {
        match msg {
            ServerMsg::GardenUpdate { file } => {
                if self.paused {
                    let text = format!("Garden updated ({file}). Updates paused.");
                    self.notify(&text, now);
                    self.log(text);
                    return Vec::new();
                }
                info!(%file, "garden updated, reloading");
                let text = format!("Garden updated: {file}");
                self.notify(&text, now);
                self.log(text);
                vec![Command::ReloadSnapshot, Command::ReloadAnalysis]
            }
            ServerMsg::ToolUsage { data } => {
                self.record_tool_usage(&data, now);
                Vec::new()
            }
            ServerMsg::ToolHistory { data } => {
                self.activity.reset();
                for usage in &data {
                    self.record_tool_usage(usage, now);
                }
                if data.is_empty() {
                    self.log("No recent activity.");
                }
                Vec::new()
            }
            ServerMsg::Pong => Vec::new(),
            ServerMsg::Unknown => {
                debug!("ignoring unknown live message kind");
                Vec::new()
            }
        }
    }

    fn record_tool_usage(&mut self, usage: &ToolUsage, now: Instant) {
        self.log(usage.describe());
        if let Some(title) = usage.created_title() {
            let id = NodeId::note(title);
            if self.model.contains(&id) {
                self.transients.pulse(id, now, self.pulse_ttl);
            }
        }
    }

    pub fn apply_snapshot(&mut self, index: &GardenIndex) {
        let (nodes, links) = build_graph(index);
        let summary = self.model.replace_all(nodes, links);
        if let Some(conns) = self.dashboards.semantic.ready() {
            merge_semantic(&mut self.model, conns);
        }
        let report = self.layout.sync(&self.model);
        self.apply_radii();
        self.dashboards.last_updated = index.last_updated().map(str::to_string);
        self.highlight = HighlightMap::neutral(&self.model);

        info!(
            nodes = self.model.len(),
            links = self.model.link_count(),
            added = summary.added.len(),
            removed = summary.removed.len(),
            reheated = report.reheated,
            "snapshot applied"
        );
        self.subscribers.publish(GardenEvent::ModelChanged {
            added: summary.added,
            removed: summary.removed,
            links: self.model.link_count(),
        });
        self.subscribers.publish(GardenEvent::HighlightChanged);
    }

    fn apply_artifact(&mut self, artifact: Artifact) {
        match artifact {
            Artifact::Analysis(a) => self.dashboards.analysis = Panel::Ready(a),
            Artifact::Communities(c) => self.dashboards.communities = Panel::Ready(c),
            Artifact::Centrality(c) => {
                self.dashboards.centrality = Panel::Ready(c);
                self.apply_radii();
            }
            Artifact::Semantic(conns) => {
                let added = merge_semantic(&mut self.model, &conns);
                self.dashboards.semantic = Panel::Ready(conns);
                if added > 0 {
                    self.layout.sync(&self.model);
                    self.highlight = HighlightMap::neutral(&self.model);
                    self.subscribers.publish(GardenEvent::ModelChanged {
                        added: Vec::new(),
                        removed: Vec::new(),
                        links: self.model.link_count(),
                    });
                }
            }
        }
    }

    fn apply_radii(&mut self) {
        for node in self.model.nodes() {
            self.layout
                .set_radius(&node.id, self.dashboards.node_radius(node));
        }
    }

    fn on_failed(&mut self, artifact: ArtifactKind, message: String) {
        warn!(?artifact, "{message}");
        match artifact {
            ArtifactKind::Index => self.log(message),
            ArtifactKind::Analysis => self.dashboards.analysis = Panel::Unavailable(message),
            ArtifactKind::Semantic => self.dashboards.semantic = Panel::Unavailable(message),
            ArtifactKind::Communities => {
                self.dashboards.communities = Panel::Unavailable(message)
            }
            ArtifactKind::Centrality => self.dashboards.centrality = Panel::Unavailable(message),
            ArtifactKind::Paths | ArtifactKind::Subgraph => self.query_status = Some(message),
        }
    }

    fn show_paths(&mut self, paths: Vec<Vec<String>>) {
        if paths.is_empty() {
            self.query_status = Some("No paths found.".to_string());
            self.set_highlight(HighlightRequest::Reset);
            return;
        }
        self.query_status = Some(format!("Found {} path(s).", paths.len()));
        let paths = paths
            .into_iter()
            .map(|p| p.into_iter().map(NodeId).collect())
            .collect();
        self.set_highlight(HighlightRequest::Paths(paths));
    }

    fn show_subgraph(&mut self, nodes: Vec<String>) {
        if nodes.is_empty() {
            self.query_status = Some("No subgraph found.".to_string());
            self.set_highlight(HighlightRequest::Reset);
            return;
        }
        self.query_status = Some(format!("Subgraph with {} node(s).", nodes.len()));
        let set: HashSet<NodeId> = nodes.into_iter().map(NodeId).collect();
        self.set_highlight(HighlightRequest::Subgraph(set));
    }

    pub fn set_highlight(&mut self, request: HighlightRequest) {
        self.highlight = highlight(&self.model, &request);
        self.subscribers.publish(GardenEvent::HighlightChanged);
    }

    pub fn reset_highlight(&mut self) {
        self.query_status = None;
        self.set_highlight(HighlightRequest::Reset);
    }

    /// Validate user input and turn it into a path fetch.
    pub fn request_paths(&self, source: &str, target: &str) -> Result<Command, QueryError> {
        query::resolve_path_query(&self.model, source, target).map(Command::FindPaths)
    }

    pub fn request_subgraph(
        &self,
        center: &str,
        distance: Option<u32>,
    ) -> Result<Command, QueryError> {
        query::resolve_subgraph_query(&self.model, center, distance).map(Command::FetchSubgraph)
    }

    /// Flip the pause flag; returns true when updates are now enabled.
    pub fn toggle_updates(&mut self) -> bool {
        self.paused = !self.paused;
        if self.paused {
            self.log("Real-time updates paused.");
        } else {
            self.log("Real-time updates enabled.");
        }
        !self.paused
    }

    pub fn clear_activity(&mut self) {
        self.activity.clear();
        self.subscribers
            .publish(GardenEvent::ActivityAppended("Activity log cleared.".to_string()));
    }

    pub fn drag_start(&mut self, id: &NodeId) -> bool {
        self.layout.drag_start(id)
    }

    pub fn drag_move(&mut self, id: &NodeId, to: Vec2) -> bool {
        self.layout.drag_move(id, to)
    }

    pub fn drag_end(&mut self, id: &NodeId) -> bool {
        self.layout.drag_end(id)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.layout.resize(width, height);
    }

    /// Advance the simulation one step. Returns false once it has cooled.
    pub fn tick(&mut self) -> bool {
        let moved = self.layout.tick();
        if moved {
            self.subscribers.publish(GardenEvent::LayoutTicked {
                alpha: self.layout.alpha(),
            });
        }
        moved
    }

    /// Expire notifications and pulses.
    pub fn housekeeping(&mut self, now: Instant) -> bool {
        self.transients.tick(now)
    }

    fn notify(&mut self, text: &str, now: Instant) {
        self.transients.notify(text, now, self.notification_ttl);
        self.subscribers
            .publish(GardenEvent::Notification(text.to_string()));
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.activity.push(message.clone());
        self.subscribers
            .publish(GardenEvent::ActivityAppended(message));
    }
}
