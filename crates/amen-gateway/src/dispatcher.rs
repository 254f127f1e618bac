use std::sync::Arc;

use tokio::sync::broadcast;

use amen_types::events::WallEvent;

/// Fans wall events out to every connected gateway client. REST handlers
/// publish after a successful write; each WebSocket connection holds a
/// receiver and applies its own category filter.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    broadcast_tx: broadcast::Sender<WallEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner { broadcast_tx }),
        }
    }

    /// Subscribe to wall events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<WallEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients. A send error only means
    /// nobody is connected, which is fine.
    pub fn broadcast(&self, event: WallEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn events_reach_subscribers() {
        let dispatcher = Dispatcher::new();
        let mut rx = dispatcher.subscribe();

        dispatcher.broadcast(WallEvent::PrayerDelete {
            id: Uuid::new_v4(),
            category: "family".into(),
        });

        match rx.recv().await.unwrap() {
            WallEvent::PrayerDelete { category, .. } => assert_eq!(category, "family"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn broadcast_without_subscribers_is_ok() {
        let dispatcher = Dispatcher::new();
        dispatcher.broadcast(WallEvent::Ready {
            user_id: Uuid::new_v4(),
            name: "Grace".into(),
        });
    }
}
