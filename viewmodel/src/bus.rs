use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events published as the flow advances.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum UiEvent {
    /// The view model moved to a new phase.
    PhaseChanged { phase: String },
    /// The visible idea count grew.
    IdeasUpdated { count: usize },
    /// Terminal analysis failure with a user-facing message.
    AnalysisFailed { message: String },
    /// An image finished uploading.
    UploadFinished { url: String },
}

/// Simple broadcast channel for UI events.
pub struct UiBus {
    tx: broadcast::Sender<UiEvent>,
}

impl UiBus {
    /// Create a new bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all subscribers. Errors are ignored.
    pub fn send(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for UiBus {
    fn default() -> Self {
        Self::new(32)
    }
}
