//! Fan-out from the detection engine to connected clients.
//!
//! A single [`Broadcaster`] is shared by every listener (plain and TLS), so a
//! detected change is emitted exactly once and each connected WebSocket
//! receives its own copy through the broadcast channel.

use serde::Serialize;
use sw_watcher::ChangeNotifier;
use tokio::sync::broadcast;

/// Wire name of the reload signal.
pub const UPDATE_EVENT: &str = "update";

/// Bounded backlog per subscriber; slow clients lag rather than block.
const CHANNEL_CAPACITY: usize = 100;

/// Event sent to connected WebSocket clients when a stylesheet changes.
///
/// Serializes as `{"type":"update"}`. There is no payload: clients reload
/// all stylesheets unconditionally.
#[derive(Clone, Debug, Serialize)]
pub struct ReloadEvent {
    /// Event type (always [`UPDATE_EVENT`]).
    #[serde(rename = "type")]
    event_type: &'static str,
}

impl ReloadEvent {
    /// Creates the reload signal.
    #[must_use]
    pub fn update() -> Self {
        Self {
            event_type: UPDATE_EVENT,
        }
    }
}

/// The shared broadcast hub.
///
/// Cloning is cheap and every clone feeds the same channel. Implements
/// [`ChangeNotifier`] so the watch engine can signal it directly.
#[derive(Clone, Debug)]
pub struct Broadcaster {
    sender: broadcast::Sender<ReloadEvent>,
}

impl Broadcaster {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Registers a new subscriber; used by each WebSocket connection.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of currently connected subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier for Broadcaster {
    fn notify_changed(&self) {
        // send only fails with zero subscribers, which is a no-op by
        // contract, never an error.
        let _ = self.sender.send(ReloadEvent::update());
    }
}
