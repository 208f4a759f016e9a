//! # Messaging
//!
//! Two ways for gameplay code to talk without holding references to
//! each other:
//!
//! - [`MessageBus`]: the per-scene queue. Everything posted during a tick
//!   is delivered to every system and director at the start of the next
//!   one, in post order.
//! - [`MessageRelay`]: a bounded channel carrying selected messages from
//!   one scene to another. This is the only coupling between scenes.

mod bus;
mod relay;

pub use bus::{Message, MessageBus, MessageId};
pub use relay::{MessageRelay, RelayReceiver, RelaySender};
