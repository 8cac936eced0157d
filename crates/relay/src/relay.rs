//! Connection event handlers: connect, message, end, disconnect.

use realtychat_config::{AppConfig, RelayConfig};
use realtychat_core::history::{History, Turn};
use realtychat_core::message::Message;
use realtychat_core::prompt;
use realtychat_core::provider::Provider;
use realtychat_core::topic::{KeywordFilter, TopicFilter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::event::ServerEvent;
use crate::model::ModelClient;
use crate::session::ConnectionSession;

/// User-visible texts the relay sends back.
#[derive(Debug, Clone)]
pub struct RelayMessages {
    pub connected: String,
    pub rejection: String,
    pub failure: String,
    pub session_ended: String,
}

impl From<&RelayConfig> for RelayMessages {
    fn from(config: &RelayConfig) -> Self {
        Self {
            connected: config.connected_message.clone(),
            rejection: config.rejection_message.clone(),
            failure: config.failure_message.clone(),
            session_ended: config.session_ended_message.clone(),
        }
    }
}

impl Default for RelayMessages {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

/// Turns client events into server events for one connection at a time.
///
/// Stateless across connections: all conversation state lives in the
/// [`ConnectionSession`] handed to each call.
pub struct Relay {
    model: ModelClient,
    filter: Arc<dyn TopicFilter>,
    history_window: usize,
    record_rejections: bool,
    messages: RelayMessages,
}

impl Relay {
    /// Create a relay with the default keyword filter and a 4-turn window.
    pub fn new(model: ModelClient) -> Self {
        Self {
            model,
            filter: Arc::new(KeywordFilter::default()),
            history_window: 4,
            record_rejections: false,
            messages: RelayMessages::default(),
        }
    }

    /// Build a relay from the loaded configuration.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let model = ModelClient::new(provider, config.effective_model())
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_timeout(Duration::from_secs(config.relay.model_timeout_secs));

        Self::new(model)
            .with_filter(Arc::new(KeywordFilter::new(
                &config.topic.keywords,
                config.topic.match_mode,
            )))
            .with_history_window(config.relay.history_window)
            .with_record_rejections(config.relay.record_rejections)
            .with_messages(RelayMessages::from(&config.relay))
    }

    pub fn with_filter(mut self, filter: Arc<dyn TopicFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Set how many recent turns are replayed into each prompt.
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    /// Store off-topic rejections as turns.
    pub fn with_record_rejections(mut self, enabled: bool) -> Self {
        self.record_rejections = enabled;
        self
    }

    pub fn with_messages(mut self, messages: RelayMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn model(&self) -> &ModelClient {
        &self.model
    }

    /// A client connected: start an empty conversation.
    pub fn on_connect(&self, session: &mut ConnectionSession) -> ServerEvent {
        session.start();
        info!(connection_id = %session.id(), "Client connected");
        ServerEvent::Connected {
            message: self.messages.connected.clone(),
        }
    }

    /// Handle one query and produce the reply event.
    ///
    /// Off-topic queries never reach the Model Service. A failed model call
    /// yields the failure message and leaves the history untouched.
    pub async fn on_message(&self, session: &mut ConnectionSession, query: &str) -> ServerEvent {
        if !session.is_active() {
            debug!(connection_id = %session.id(), "Message without a session, starting one");
            session.start();
        }

        let reply = if !self.filter.is_on_topic(query) {
            info!(
                connection_id = %session.id(),
                query_len = query.len(),
                "Query rejected as off-topic"
            );
            if self.record_rejections {
                session.record(Turn::new(query, &self.messages.rejection));
            }
            self.messages.rejection.clone()
        } else {
            let context = match session.history() {
                Some(history) => self.context_for(history, query),
                None => self.context_for(&History::new(), query),
            };
            debug!(
                connection_id = %session.id(),
                messages = context.len(),
                "Forwarding query to model"
            );

            match self.model.generate(context).await {
                Ok(text) => {
                    session.record(Turn::new(query, &text));
                    info!(
                        connection_id = %session.id(),
                        turns = session.turn_count(),
                        "Reply sent"
                    );
                    text
                }
                Err(e) => {
                    warn!(
                        connection_id = %session.id(),
                        provider = %self.model.provider_name(),
                        error = %e,
                        "Model call failed"
                    );
                    self.messages.failure.clone()
                }
            }
        };

        ServerEvent::AgentResponse { message: reply }
    }

    /// The client asked to end the conversation.
    pub fn on_end(&self, session: &mut ConnectionSession) -> ServerEvent {
        info!(
            connection_id = %session.id(),
            turns = session.turn_count(),
            "Session ended by client"
        );
        session.end();
        ServerEvent::SessionEnded {
            message: self.messages.session_ended.clone(),
        }
    }

    /// The transport went away. Nothing is sent back.
    pub fn on_disconnect(&self, session: &mut ConnectionSession) {
        info!(
            connection_id = %session.id(),
            turns = session.turn_count(),
            "Client disconnected"
        );
        session.end();
    }

    /// Model context for `query`: the composed prompt, then each recent turn
    /// as its raw user text followed by the reply.
    pub fn context_for(&self, history: &History, query: &str) -> Vec<Message> {
        let recent = history.recent_turns(self.history_window);
        let mut messages = Vec::with_capacity(1 + recent.len() * 2);
        messages.push(Message::user(prompt::compose(query)));
        messages.extend(recent.iter().flat_map(Turn::to_messages));
        messages
    }
}
