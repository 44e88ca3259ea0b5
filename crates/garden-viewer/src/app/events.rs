use crossbeam_channel::{unbounded, Receiver, Sender};
use garden_core::NodeId;

use crate::net::live::ChannelState;

#[derive(Debug, Clone, PartialEq)]
pub enum GardenEvent {
    ModelChanged {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        links: usize,
    },
    LayoutTicked {
        alpha: f32,
    },
    HighlightChanged,
    ActivityAppended(String),
    Notification(String),
    ChannelState(ChannelState),
}

/// Fan-out of state changes to anyone listening. Subscribers that went
/// away are pruned on the next publish.
#[derive(Debug, Default)]
pub struct Subscribers {
    senders: Vec<Sender<GardenEvent>>,
}

impl Subscribers {
    pub fn subscribe(&mut self) -> Receiver<GardenEvent> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    pub fn publish(&mut self, event: GardenEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
