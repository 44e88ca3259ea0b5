use anyhow::Result;
use clap::Parser;
use garden_viewer::util::config;
use garden_viewer::{App, GardenEvent, ViewerConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless knowledge-garden viewer")]
struct Args {
    /// Config file to use instead of the platform config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = "GARDEN_INDEX_URL")]
    index_url: Option<String>,

    #[arg(long, env = "GARDEN_API_BASE")]
    api_base: Option<String>,

    #[arg(long, env = "GARDEN_WS_URL")]
    ws_url: Option<String>,

    /// Start with real-time updates paused.
    #[arg(long)]
    paused: bool,

    /// Do not open the live update channel.
    #[arg(long)]
    no_live: bool,

    /// Stop after this many seconds.
    #[arg(long)]
    exit_after: Option<u64>,

    /// Write the effective config back to disk and exit.
    #[arg(long)]
    save_config: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn effective_config(args: &Args) -> ViewerConfig {
    let mut cfg = match &args.config {
        Some(path) => config::load_or_default_from_path(path),
        None => config::load_or_default(),
    };
    if let Some(url) = &args.index_url {
        cfg.index_url = url.clone();
    }
    if let Some(base) = &args.api_base {
        cfg.api_base = base.clone();
    }
    if let Some(url) = &args.ws_url {
        cfg.ws_url = url.clone();
    }
    cfg
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let cfg = effective_config(&args);

    if args.save_config {
        let path = match &args.config {
            Some(path) => {
                config::save_to_path(&cfg, path)?;
                path.clone()
            }
            None => config::save(&cfg)?,
        };
        tracing::info!(path = %path.display(), "config saved");
        return Ok(());
    }

    let mut app = App::new(cfg)?;
    let events = app.state.subscribe();
    std::thread::Builder::new()
        .name("garden-events".to_string())
        .spawn(move || {
            for ev in events {
                match ev {
                    GardenEvent::LayoutTicked { .. } => {}
                    GardenEvent::ActivityAppended(msg) => tracing::info!("activity: {msg}"),
                    GardenEvent::Notification(msg) => tracing::info!("notice: {msg}"),
                    other => tracing::debug!(?other, "event"),
                }
            }
        })?;

    if args.paused {
        app.state.toggle_updates();
    }
    if args.no_live {
        for cmd in app.state.initial_commands() {
            app.execute(cmd);
        }
    } else {
        app.start()?;
    }

    let stop = Arc::new(AtomicBool::new(false));
    if let Some(secs) = args.exit_after {
        let stop = stop.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            stop.store(true, Ordering::Relaxed);
        });
    }

    app.run(&stop);

    let stats = app.state.dashboards.stats(&app.state.model);
    tracing::info!(
        notes = stats.model.notes,
        tags = stats.model.tags,
        connections = stats.model.connections,
        last_updated = stats.last_updated.as_deref().unwrap_or("unknown"),
        "viewer stopped"
    );
    Ok(())
}
