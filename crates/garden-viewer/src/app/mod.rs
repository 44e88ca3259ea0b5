use anyhow::Context;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::graph::query::QueryError;
use crate::graph::{Command, GardenState};
use crate::net::api::{self, GardenApi};
use crate::net::{spawn_live_channel, Artifact, Incoming, LiveHandle};
use crate::util::config::ViewerConfig;

pub mod events;

/// Event thread driver: owns the state, drains the inbox each frame, and
/// runs fetches on a small tokio runtime whose results come back through
/// the same inbox.
pub struct App {
    pub state: GardenState,
    cfg: ViewerConfig,
    api: GardenApi,
    rt: Runtime,
    tx: Sender<Incoming>,
    rx: Receiver<Incoming>,
    live: Option<LiveHandle>,
}

impl App {
    pub fn new(cfg: ViewerConfig) -> anyhow::Result<Self> {
        let api = GardenApi::new(&cfg.index_url, &cfg.api_base, cfg.http_timeout())
            .context("failed to build HTTP client")?;
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("garden-fetch")
            .enable_all()
            .build()
            .context("failed to start fetch runtime")?;
        let (tx, rx) = unbounded();
        Ok(Self {
            state: GardenState::new(&cfg),
            cfg,
            api,
            rt,
            tx,
            rx,
            live: None,
        })
    }

    pub fn start(&mut self) -> anyhow::Result<()> {
        for cmd in self.state.initial_commands() {
            self.execute(cmd);
        }
        self.connect_live()
    }

    pub fn connect_live(&mut self) -> anyhow::Result<()> {
        if self.live.is_some() {
            return Ok(());
        }
        let handle = spawn_live_channel(self.cfg.live(), self.tx.clone())
            .context("failed to spawn live channel thread")?;
        info!(url = %self.cfg.ws_url, "live channel started");
        self.live = Some(handle);
        Ok(())
    }

    /// Explicit restart for a channel that gave up.
    pub fn reset_live(&self) {
        if let Some(live) = &self.live {
            live.reset();
        }
    }

    pub fn execute(&self, cmd: Command) {
        match cmd {
            Command::ReloadSnapshot => {
                let api = self.api.clone();
                self.fetch(async move { api.index().await }, Incoming::snapshot);
            }
            Command::ReloadAnalysis => {
                let api = self.api.clone();
                self.fetch(async move { api.analysis().await }, |s, a| {
                    Incoming::artifact(s, Artifact::Analysis(a))
                });
                let api = self.api.clone();
                self.fetch(async move { api.semantic_connections().await }, |s, c| {
                    Incoming::artifact(s, Artifact::Semantic(c))
                });
                let api = self.api.clone();
                self.fetch(async move { api.communities().await }, |s, c| {
                    Incoming::artifact(s, Artifact::Communities(c))
                });
                let api = self.api.clone();
                self.fetch(async move { api.centrality().await }, |s, c| {
                    Incoming::artifact(s, Artifact::Centrality(c))
                });
            }
            Command::FindPaths(q) => {
                let api = self.api.clone();
                self.fetch(
                    async move { api.paths(q.source.as_str(), q.target.as_str()).await },
                    Incoming::paths,
                );
            }
            Command::FetchSubgraph(q) => {
                let api = self.api.clone();
                self.fetch(
                    async move { api.subgraph(q.center.as_str(), q.distance).await },
                    Incoming::subgraph,
                );
            }
        }
    }

    fn fetch<T, Fut>(&self, fut: Fut, wrap: fn(String, T) -> Incoming)
    where
        T: Send + 'static,
        Fut: Future<Output = api::Result<T>> + Send + 'static,
    {
        let tx = self.tx.clone();
        let source = self.cfg.api_base.clone();
        self.rt.spawn(async move {
            let inc = match fut.await {
                Ok(v) => wrap(source, v),
                Err(e) => {
                    warn!(error = %e, "fetch failed");
                    Incoming::failed(source, e.artifact(), e.fallback_message())
                }
            };
            let _ = tx.send(inc);
        });
    }

    pub fn find_paths(&self, source: &str, target: &str) -> Result<(), QueryError> {
        let cmd = self.state.request_paths(source, target)?;
        self.execute(cmd);
        Ok(())
    }

    pub fn extract_subgraph(&self, center: &str, distance: Option<u32>) -> Result<(), QueryError> {
        let cmd = self.state.request_subgraph(center, distance)?;
        self.execute(cmd);
        Ok(())
    }

    /// Apply everything currently queued. Returns how many messages ran.
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        let pending: Vec<Incoming> = self.rx.try_iter().take(100_000).collect();
        for inc in pending {
            n += 1;
            for cmd in self.state.apply(inc) {
                self.execute(cmd);
            }
        }
        n
    }

    /// Block up to `timeout` for the first message, then drain the rest.
    pub fn pump_wait(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(inc) => {
                for cmd in self.state.apply(inc) {
                    self.execute(cmd);
                }
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// One frame: messages, then a layout step, then expiry.
    pub fn frame(&mut self) {
        self.pump();
        self.state.tick();
        self.state.housekeeping(Instant::now());
    }

    pub fn run(&mut self, stop: &AtomicBool) {
        let frame = self.cfg.tick_interval();
        while !stop.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.frame();
            if !self.state.layout.is_active() {
                // Idle: sleep on the inbox instead of spinning.
                self.pump_wait(frame);
            } else if let Some(rest) = frame.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        if let Some(live) = self.live.take() {
            live.shutdown();
        }
    }
}
