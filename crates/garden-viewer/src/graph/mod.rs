pub mod activity;
pub mod build;
pub mod dashboard;
pub mod highlight;
pub mod layout;
pub mod model;
pub mod query;
pub mod state;

pub use highlight::{highlight, HighlightMap, HighlightRequest, Mark};
pub use layout::{LayoutAdapter, LayoutParams};
pub use model::{GraphModel, LinkDedup, ReplaceSummary};
pub use state::{Command, GardenState};
