use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::graph::layout::LayoutParams;
use crate::graph::model::LinkDedup;
use crate::net::live::LiveConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub index_url: String,
    pub api_base: String,
    pub ws_url: String,
    pub http_timeout_secs: u64,

    pub reconnect_delay_ms: u64,
    pub max_reconnect_attempts: u32,
    pub ping_interval_secs: u64,

    pub activity_log_max: usize,
    pub notification_ms: u64,
    pub pulse_ms: u64,
    pub link_dedup: LinkDedup,

    pub width: f32,
    pub height: f32,
    pub link_distance: f32,
    pub charge: f32,
    pub collide_padding: f32,
    pub velocity_decay: f32,
    pub tick_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let layout = LayoutParams::default();
        Self {
            index_url: "http://localhost:8000/index.json".to_string(),
            api_base: "http://localhost:8001/api".to_string(),
            ws_url: "ws://localhost:8001".to_string(),
            http_timeout_secs: 30,
            reconnect_delay_ms: 3000,
            max_reconnect_attempts: 5,
            ping_interval_secs: 30,
            activity_log_max: 200,
            notification_ms: 5000,
            pulse_ms: 1000,
            link_dedup: LinkDedup::Endpoints,
            width: 960.0,
            height: 600.0,
            link_distance: layout.link_distance,
            charge: layout.charge,
            collide_padding: layout.collide_padding,
            velocity_decay: layout.velocity_decay,
            tick_ms: 16,
        }
    }
}

impl ViewerConfig {
    pub fn live(&self) -> LiveConfig {
        LiveConfig {
            url: self.ws_url.clone(),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            max_attempts: self.max_reconnect_attempts,
            ping_interval: Duration::from_secs(self.ping_interval_secs.max(1)),
        }
    }

    pub fn layout(&self) -> LayoutParams {
        LayoutParams {
            link_distance: self.link_distance,
            charge: self.charge,
            collide_padding: self.collide_padding,
            velocity_decay: self.velocity_decay.clamp(0.0, 1.0),
            ..LayoutParams::default()
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn pulse_ttl(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "knowledge-garden")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

pub fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed viewer config");
            ViewerConfig::default()
        }
    }
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<PathBuf> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)?;
    Ok(path)
}

pub fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("viewer.toml");
        let cfg = ViewerConfig {
            link_dedup: LinkDedup::EndpointsAndKind,
            max_reconnect_attempts: 9,
            ..ViewerConfig::default()
        };

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "ws_url = \"ws://garden.local:9001\"\nlink_dedup = \"endpoints_and_kind\"\n")
            .expect("write");

        let cfg = load_or_default_from_path(&path);
        assert_eq!(cfg.ws_url, "ws://garden.local:9001");
        assert_eq!(cfg.link_dedup, LinkDedup::EndpointsAndKind);
        assert_eq!(cfg.reconnect_delay_ms, 3000);
        assert_eq!(cfg.live().url, "ws://garden.local:9001");
    }

    #[test]
    fn malformed_or_missing_file_uses_defaults() {
        let dir = tempdir().expect("tempdir");
        assert_eq!(
            load_or_default_from_path(&dir.path().join("absent.toml")),
            ViewerConfig::default()
        );

        let path = dir.path().join("viewer.toml");
        fs::write(&path, "max_reconnect_attempts = \"lots\"").expect("write");
        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());
    }

    #[test]
    fn live_and_layout_views() {
        let cfg = ViewerConfig::default();
        assert_eq!(cfg.live(), LiveConfig::default());
        assert_eq!(cfg.layout(), LayoutParams::default());
    }
}
