//! The conversation relay — the heart of realtychat.
//!
//! Every client event on a connection goes through [`Relay`]:
//!
//! 1. **Connect** opens an empty history for the connection
//! 2. **Message** is gated by the topic filter
//! 3. **On-topic** queries get the persona prompt plus the recent turns and are
//!    sent to the Model Service through [`ModelClient`]
//! 4. **The reply** is recorded as a turn and sent back
//! 5. **End / disconnect** discards the history
//!
//! Session state is an explicit [`ConnectionSession`] owned by the connection
//! handler; the relay itself holds no per-connection state.

pub mod event;
pub mod model;
pub mod relay;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use event::{ClientEvent, ServerEvent};
pub use model::ModelClient;
pub use relay::{Relay, RelayMessages};
pub use session::{ConnectionSession, SessionHandle, SessionState, SessionStore};
