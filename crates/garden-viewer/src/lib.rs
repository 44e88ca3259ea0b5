//! Knowledge-garden viewer core: graph model, force layout, highlight
//! queries and the live update channel, driven from a single event thread.

pub mod app;
pub mod graph;
pub mod net;
pub mod util;

pub use app::events::{GardenEvent, Subscribers};
pub use app::App;
pub use graph::{Command, GardenState};
pub use util::config::ViewerConfig;
