//! Per-scene message queue.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Numeric message identifier. Applications define their own ranges.
pub type MessageId = u32;

/// An immutable event: a numeric id plus a typed payload.
///
/// The payload is reference counted so the same message can be handed
/// to every handler and relayed to another scene without copying it.
#[derive(Clone)]
pub struct Message {
    id: MessageId,
    payload: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Message {
    /// Wraps a payload.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(id: MessageId, payload: T) -> Self {
        Self {
            id,
            payload: Arc::new(payload),
            type_name: type_name::<T>(),
        }
    }

    /// The message id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Borrows the payload if it is a `T`.
    #[inline]
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// True if the payload is a `T`.
    #[inline]
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// Type name of the payload.
    #[inline]
    #[must_use]
    pub const fn payload_type(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("payload", &self.type_name)
            .finish()
    }
}

/// Queue of messages waiting for the next delivery pass.
///
/// The scene drains the queue *before* delivering, so anything posted
/// while handlers run lands here and waits a full pass.
pub struct MessageBus {
    pending: Vec<Message>,
    capacity: usize,
    posted_total: u64,
}

impl MessageBus {
    /// Creates a bus that reserves room for `capacity` messages per pass.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            capacity,
            posted_total: 0,
        }
    }

    /// Posts a default-initialised `T` and returns it for the producer to fill.
    ///
    /// ```rust,ignore
    /// let event = bus.post::<NpcEvent>(NPC_MESSAGE);
    /// event.kind = NpcEventKind::Died;
    /// event.position = tx.position;
    /// ```
    pub fn post<T: Any + Send + Sync + Default>(&mut self, id: MessageId) -> &mut T {
        self.push(Message::new(id, T::default()));
        let fresh = self
            .pending
            .last_mut()
            .and_then(|message| Arc::get_mut(&mut message.payload))
            .and_then(|payload| payload.downcast_mut::<T>());
        match fresh {
            Some(payload) => payload,
            None => unreachable!("a freshly posted payload is uniquely owned"),
        }
    }

    /// Posts a fully built payload.
    pub fn post_value<T: Any + Send + Sync>(&mut self, id: MessageId, payload: T) {
        self.push(Message::new(id, payload));
    }

    /// Enqueues an existing message, e.g. one relayed from another scene.
    pub fn push(&mut self, message: Message) {
        if self.pending.len() == self.capacity {
            tracing::debug!(
                capacity = self.capacity,
                "message queue grew past its reserved capacity"
            );
        }
        self.pending.push(message);
        self.posted_total += 1;
    }

    /// Messages waiting for the next pass.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is waiting.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Messages posted over the bus lifetime.
    #[inline]
    #[must_use]
    pub const fn posted_total(&self) -> u64 {
        self.posted_total
    }

    /// Moves every pending message into `out`, oldest first.
    pub(crate) fn drain_into(&mut self, out: &mut Vec<Message>) {
        out.clear();
        out.append(&mut self.pending);
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(256)
    }
}
