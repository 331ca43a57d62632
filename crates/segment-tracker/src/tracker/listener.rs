use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use super::{TrackerEvent, TrackerNotification};

/// Observer of tracker state transitions.
///
/// Called synchronously from inside tracker operations; a listener that
/// wants to reposition the tracker must defer that to its own next turn.
pub trait TrackerListener: Send + Sync {
    fn tracker_event(&self, event: &TrackerEvent<'_>);
}

impl<F> TrackerListener for F
where
    F: Fn(&TrackerEvent<'_>) + Send + Sync,
{
    fn tracker_event(&self, event: &TrackerEvent<'_>) {
        self(event)
    }
}

/// Listeners in registration order.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn TrackerListener>>,
}

impl ListenerRegistry {
    pub fn register(&mut self, listener: Arc<dyn TrackerListener>) {
        self.listeners.push(listener);
    }

    pub fn notify(&self, event: &TrackerEvent<'_>) {
        for listener in &self.listeners {
            listener.tracker_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Forwards owned notifications to an async consumer.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<TrackerNotification>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TrackerNotification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn from_sender(sender: mpsc::UnboundedSender<TrackerNotification>) -> Self {
        Self { sender }
    }
}

impl TrackerListener for ChannelListener {
    fn tracker_event(&self, event: &TrackerEvent<'_>) {
        if self.sender.send(event.to_notification()).is_err() {
            trace!(kind = ?event.kind(), "Notification receiver dropped");
        }
    }
}
