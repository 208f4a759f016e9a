//! Cross-scene message relay.
//!
//! ```text
//! ┌─────────────┐  selected ids  ┌─────────┐  forward_message  ┌─────────────┐
//! │  Game scene │───────────────>│  Relay  │──────────────────>│   HUD scene │
//! └─────────────┘                └─────────┘                   └─────────────┘
//! ```
//!
//! Bounded so a scene that stops draining cannot grow memory. A full relay
//! drops the message; the drop is counted, never surfaced as an error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::bus::Message;

/// A bounded channel of [`Message`]s between two scenes.
pub struct MessageRelay {
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    dropped: Arc<AtomicU64>,
}

impl MessageRelay {
    /// Creates a relay holding at most `capacity` messages in flight.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> RelaySender {
        RelaySender {
            sender: self.sender.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> RelayReceiver {
        RelayReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Messages dropped because the relay was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle for sending into a relay.
#[derive(Clone)]
pub struct RelaySender {
    sender: Sender<Message>,
    dropped: Arc<AtomicU64>,
}

impl RelaySender {
    /// Sends a message (non-blocking).
    ///
    /// Returns `false` if the relay is full or the receiving side is gone.
    #[inline]
    pub fn send(&self, message: Message) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(id = message.id(), "relay full, message dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for draining a relay.
#[derive(Clone)]
pub struct RelayReceiver {
    receiver: Receiver<Message>,
}

impl RelayReceiver {
    /// Receives one message (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Takes every pending message, oldest first.
    pub fn drain(&self) -> impl Iterator<Item = Message> + '_ {
        self.receiver.try_iter()
    }

    /// Returns the number of pending messages.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_send_receive() {
        let relay = MessageRelay::new(8);
        let sender = relay.sender();
        let receiver = relay.receiver();

        assert!(sender.send(Message::new(3, 42u32)));
        assert_eq!(receiver.pending_count(), 1);

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.id(), 3);
        assert_eq!(received.data::<u32>(), Some(&42));
    }

    #[test]
    fn test_full_relay_drops() {
        let relay = MessageRelay::new(2);
        let sender = relay.sender();

        assert!(sender.send(Message::new(1, ())));
        assert!(sender.send(Message::new(2, ())));
        assert!(!sender.send(Message::new(3, ())));
        assert_eq!(relay.dropped(), 1);

        let ids: Vec<u32> = relay.receiver().drain().map(|m| m.id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
