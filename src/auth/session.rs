use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn { user_id: u64, email: String },
    SignedOut { user_id: u64 },
}

/// Sign-in / sign-out notifications for anything that tracks live sessions.
#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

/// Writes every session event to the log until the channel closes.
pub fn spawn_event_logger(events: &SessionEvents) {
    let mut rx = events.subscribe();
    actix_web::rt::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(SessionEvent::SignedIn { user_id, email }) => {
                    info!(user_id, %email, "Session signed in")
                }
                Ok(SessionEvent::SignedOut { user_id }) => info!(user_id, "Session signed out"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session event logger lagged")
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
