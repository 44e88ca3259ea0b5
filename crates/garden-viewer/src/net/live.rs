//! Reconnecting push-notification client.
//!
//! Runs on its own thread with a single-threaded tokio runtime and hands
//! everything it hears to the event thread over a crossbeam channel.

use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use garden_core::{ClientMsg, ServerMsg};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::net::Incoming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    ClosedClean,
    ClosedError,
    /// Retries exhausted; only `LiveHandle::reset` starts it again.
    GaveUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveConfig {
    pub url: String,
    pub reconnect_delay: Duration,
    pub max_attempts: u32,
    pub ping_interval: Duration,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8001".to_string(),
            reconnect_delay: Duration::from_millis(3000),
            max_attempts: 5,
            ping_interval: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    Retry { attempt: u32, delay: Duration },
    GiveUp,
}

/// Fixed-delay retry budget over consecutive failures.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    delay: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn on_open(&mut self) {
        self.attempts = 0;
    }

    pub fn on_close(&mut self) -> ReconnectDecision {
        if self.attempts < self.max_attempts {
            self.attempts += 1;
            ReconnectDecision::Retry {
                attempt: self.attempts,
                delay: self.delay,
            }
        } else {
            ReconnectDecision::GiveUp
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[derive(Debug)]
enum Control {
    Reset,
    Shutdown,
}

pub struct LiveHandle {
    control: mpsc::UnboundedSender<Control>,
    thread: Option<JoinHandle<()>>,
}

impl LiveHandle {
    /// Restart a channel that gave up, or skip a pending retry delay.
    pub fn reset(&self) {
        let _ = self.control.send(Control::Reset);
    }

    pub fn shutdown(mut self) {
        let _ = self.control.send(Control::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        let _ = self.control.send(Control::Shutdown);
    }
}

pub fn spawn_live_channel(cfg: LiveConfig, tx: Sender<Incoming>) -> std::io::Result<LiveHandle> {
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let thread = std::thread::Builder::new()
        .name("garden-live".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = tx.send(Incoming::error(cfg.url.clone(), format!("tokio runtime: {e}")));
                    return;
                }
            };
            rt.block_on(run(cfg, tx, control_rx));
        })?;
    Ok(LiveHandle {
        control: control_tx,
        thread: Some(thread),
    })
}

enum SessionEnd {
    Clean,
    Error,
    Shutdown,
}

async fn run(cfg: LiveConfig, tx: Sender<Incoming>, mut control: mpsc::UnboundedReceiver<Control>) {
    let source = cfg.url.clone();
    let mut policy = ReconnectPolicy::new(cfg.reconnect_delay, cfg.max_attempts);

    loop {
        let _ = tx.send(Incoming::channel(source.clone(), ChannelState::Connecting));
        let closed = match session(&cfg, &tx, &mut control, &mut policy).await {
            SessionEnd::Clean => ChannelState::ClosedClean,
            SessionEnd::Error => ChannelState::ClosedError,
            SessionEnd::Shutdown => {
                let _ = tx.send(Incoming::channel(source.clone(), ChannelState::ClosedClean));
                return;
            }
        };
        let _ = tx.send(Incoming::channel(source.clone(), closed));

        match policy.on_close() {
            ReconnectDecision::Retry { attempt, delay } => {
                info!(url = %source, attempt, "live channel reconnecting");
                let _ = tx.send(Incoming::reconnecting(source.clone(), attempt, delay));
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    ctrl = control.recv() => match ctrl {
                        Some(Control::Reset) => policy.reset(),
                        Some(Control::Shutdown) | None => return,
                    },
                }
            }
            ReconnectDecision::GiveUp => {
                warn!(url = %source, "live channel gave up after {} attempts", cfg.max_attempts);
                let _ = tx.send(Incoming::channel(source.clone(), ChannelState::GaveUp));
                match control.recv().await {
                    Some(Control::Reset) => {
                        info!(url = %source, "live channel reset");
                        policy.reset();
                    }
                    Some(Control::Shutdown) | None => return,
                }
            }
        }
    }
}

async fn session(
    cfg: &LiveConfig,
    tx: &Sender<Incoming>,
    control: &mut mpsc::UnboundedReceiver<Control>,
    policy: &mut ReconnectPolicy,
) -> SessionEnd {
    let source = &cfg.url;
    let connected = loop {
        tokio::select! {
            res = connect_async(cfg.url.as_str()) => break res,
            ctrl = control.recv() => match ctrl {
                Some(Control::Reset) => {
                    debug!(url = %source, "reset while connecting, restarting connect");
                    policy.reset();
                }
                Some(Control::Shutdown) | None => return SessionEnd::Shutdown,
            },
        }
    };
    let ws = match connected {
        Ok((ws, _)) => ws,
        Err(e) => {
            warn!(url = %source, error = %e, "live channel connect failed");
            return SessionEnd::Error;
        }
    };
    let ping_frame = match serde_json::to_string(&ClientMsg::Ping) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to encode ping");
            return SessionEnd::Error;
        }
    };

    policy.on_open();
    info!(url = %source, "live channel open");
    let _ = tx.send(Incoming::channel(source.clone(), ChannelState::Open));

    let (mut sink, mut stream) = ws.split();
    let mut ping = interval_at(Instant::now() + cfg.ping_interval, cfg.ping_interval);

    loop {
        tokio::select! {
            _ = ping.tick() => {
                if let Err(e) = sink.send(Message::Text(ping_frame.clone())).await {
                    warn!(url = %source, error = %e, "ping failed");
                    return SessionEnd::Error;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => forward(source, &text, tx),
                Some(Ok(Message::Close(_))) | None => {
                    info!(url = %source, "live channel closed");
                    return SessionEnd::Clean;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(url = %source, error = %e, "live channel error");
                    return SessionEnd::Error;
                }
            },
            ctrl = control.recv() => match ctrl {
                Some(Control::Reset) => debug!("reset ignored while open"),
                Some(Control::Shutdown) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }
            },
        }
    }
}

fn forward(source: &str, text: &str, tx: &Sender<Incoming>) {
    match serde_json::from_str::<ServerMsg>(text) {
        Ok(ServerMsg::Unknown) => debug!(frame = %text, "ignoring unknown live message kind"),
        Ok(ServerMsg::Pong) => {}
        Ok(msg) => {
            let _ = tx.send(Incoming::server(source.to_string(), msg));
        }
        Err(e) => {
            warn!(error = %e, "undecodable live message");
            let _ = tx.send(Incoming::error(source.to_string(), format!("decode error: {e}")));
        }
    }
}
