//! crates/visa_guide_core/src/events.rs
//!
//! A typed publish/subscribe channel owned by the detail screen. Dropping a
//! receiver unsubscribes it; dropping the channel ends every subscription.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::content::DetailTab;

/// Buffer size of the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistSync {
    pub index: usize,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JourneyEvent {
    /// A checklist item changed because a step was completed or the user
    /// ticked it.
    ChecklistSync(ChecklistSync),
    /// Jump to a tab and, optionally, scroll to an anchor within it.
    SwitchTab { tab: DetailTab, anchor: Option<String> },
}

#[derive(Debug, Clone)]
pub struct EventChannel {
    sender: broadcast::Sender<JourneyEvent>,
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JourneyEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the event. Publishing
    /// with nobody listening is not an error.
    pub fn publish(&self, event: JourneyEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
