//! # realtychat Core
//!
//! Domain types, traits, and error definitions for the realtychat relay.
//! This crate has **no framework dependencies**: it holds the conversation
//! model, the topic and prompt policies, and the `Provider` seam that the
//! other crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: model-facing messages and connection identity
//! - [`history`]: completed turns and the bounded read window
//! - [`topic`]: on/off-topic classification
//! - [`prompt`]: the persona prompt template
//! - [`provider`]: the Model Service abstraction

pub mod error;
pub mod history;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod topic;

// Re-export key types at crate root for ergonomics
pub use error::ProviderError;
pub use history::{History, Turn};
pub use message::{ConnectionId, Message, Role};
pub use prompt::compose;
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use topic::{KeywordFilter, MatchMode, TopicFilter};
