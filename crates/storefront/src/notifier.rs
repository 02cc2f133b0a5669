//! Change notifications between independently rendered views.
//!
//! Components that mutate the session or the cart broadcast a payload-free
//! [`ChangeEvent`] after their write is durable. Views hold a
//! [`Subscription`] and re-read the engine on every event; the event never
//! carries state.
//!
//! Subscribing and unsubscribing are paired: a subscription is registered
//! when [`ChangeNotifier::subscribe`] returns and released when the
//! [`Subscription`] is dropped or passed to [`Subscription::unsubscribe`].

use std::fmt;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Events buffered per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// Kind of state that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    /// A shopper logged in or out.
    SessionChanged,
    /// The cart's contents changed.
    CartChanged,
}

impl ChangeEvent {
    /// Event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionChanged => "session-changed",
            Self::CartChanged => "cart-changed",
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide publish point. Cheap to clone; clones share subscribers.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    /// A notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Deliver `event` to every live subscriber.
    ///
    /// Having no subscribers is normal (no view is listening).
    pub fn broadcast(&self, event: ChangeEvent) {
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!(%event, delivered, "Broadcast change event");
    }

    /// Register a subscriber. Only events broadcast after this call are seen.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A registered listener. Dropping it unregisters.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// If this subscriber fell more than the buffer behind, the skipped events
    /// are dropped and the oldest retained one is returned; a re-read after
    /// any event catches up with everything missed. Returns `None` once every
    /// notifier handle is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged behind change events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next pending event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged behind change events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every pending event, in broadcast order.
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Unregister explicitly.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(ChangeEvent::SessionChanged.as_str(), "session-changed");
        assert_eq!(ChangeEvent::CartChanged.to_string(), "cart-changed");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_fine() {
        let notifier = ChangeNotifier::new();
        notifier.broadcast(ChangeEvent::CartChanged);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_every_subscriber_gets_every_event() {
        let notifier = ChangeNotifier::new();
        let mut navbar = notifier.subscribe();
        let mut drawer = notifier.clone().subscribe();

        notifier.broadcast(ChangeEvent::SessionChanged);
        notifier.broadcast(ChangeEvent::CartChanged);

        let expected = vec![ChangeEvent::SessionChanged, ChangeEvent::CartChanged];
        assert_eq!(navbar.drain(), expected);
        assert_eq!(drawer.drain(), expected);
        assert_eq!(navbar.try_recv(), None);
    }

    #[test]
    fn test_subscription_only_sees_later_events() {
        let notifier = ChangeNotifier::new();
        notifier.broadcast(ChangeEvent::CartChanged);
        let mut late = notifier.subscribe();
        assert_eq!(late.try_recv(), None);
    }

    #[test]
    fn test_unsubscribe_releases() {
        let notifier = ChangeNotifier::new();
        let first = notifier.subscribe();
        let second = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        first.unsubscribe();
        assert_eq!(notifier.subscriber_count(), 1);
        drop(second);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_lagging_subscriber_keeps_receiving() {
        let notifier = ChangeNotifier::new();
        let mut slow = notifier.subscribe();
        for _ in 0..(CHANNEL_CAPACITY + 10) {
            notifier.broadcast(ChangeEvent::CartChanged);
        }
        notifier.broadcast(ChangeEvent::SessionChanged);

        let events = slow.drain();
        assert_eq!(events.len(), CHANNEL_CAPACITY);
        assert_eq!(events.last(), Some(&ChangeEvent::SessionChanged));
    }

    #[tokio::test]
    async fn test_recv_waits_for_event() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();
        let publisher = notifier.clone();
        tokio::spawn(async move {
            publisher.broadcast(ChangeEvent::SessionChanged);
        });
        assert_eq!(sub.recv().await, Some(ChangeEvent::SessionChanged));
    }

    #[tokio::test]
    async fn test_recv_ends_when_notifier_dropped() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();
        drop(notifier);
        assert_eq!(sub.recv().await, None);
    }
}
