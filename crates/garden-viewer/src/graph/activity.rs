use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant, SystemTime};

use garden_core::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub at: SystemTime,
    pub message: String,
}

/// Bounded, append-only session log. The oldest entries fall off once the
/// cap is reached.
#[derive(Debug)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    max_entries: usize,
}

impl ActivityLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(SystemTime::now(), message);
    }

    pub fn push_at(&mut self, at: SystemTime, message: impl Into<String>) {
        self.entries.push_back(ActivityEntry {
            at,
            message: message.into(),
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// User-initiated clear; leaves a single marker entry behind.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.push("Activity log cleared.");
    }

    pub(crate) fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub until: Instant,
}

/// Short-lived UI state: the banner notification and node pulses.
#[derive(Debug, Default)]
pub struct Transients {
    pub notification: Option<Notification>,
    pulses: HashMap<NodeId, Instant>,
}

impl Transients {
    pub fn notify(&mut self, text: impl Into<String>, now: Instant, ttl: Duration) {
        self.notification = Some(Notification {
            text: text.into(),
            until: now + ttl,
        });
    }

    pub fn pulse(&mut self, id: NodeId, now: Instant, ttl: Duration) {
        self.pulses.insert(id, now + ttl);
    }

    pub fn is_pulsing(&self, id: &NodeId) -> bool {
        self.pulses.contains_key(id)
    }

    /// Drop expired entries. Returns true when anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let before = self.pulses.len();
        self.pulses.retain(|_, until| *until > now);
        let mut changed = self.pulses.len() != before;
        if self.notification.as_ref().is_some_and(|n| n.until <= now) {
            self.notification = None;
            changed = true;
        }
        changed
    }
}
