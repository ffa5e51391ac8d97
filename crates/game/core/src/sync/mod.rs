//! Tick-aligned outbound synchronization.
//!
//! Mutations only mark entries dirty; once per tick the owner flushes the
//! [`DirtySets`], producing at most one message per channel. Producing
//! messages is separate from sending them, so the flush can be tested without
//! a transport.

mod dirty;
pub mod message;

pub use dirty::{DirtySets, SyncChannels, SyncSource, fixed_point};
pub use message::{MessageId, MessageIn, MessageOut, WireError};
