pub mod api;
pub mod live;
pub mod protocol;

pub use api::{ApiError, ArtifactKind, GardenApi};
pub use live::{spawn_live_channel, ChannelState, LiveConfig, LiveHandle};
pub use protocol::{Artifact, Incoming, IncomingKind};
