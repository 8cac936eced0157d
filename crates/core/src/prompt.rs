//! The persona prompt sent ahead of every on-topic query.

/// Persona line that opens every prompt.
pub const PERSONA: &str = "You are a helpful, crisp real estate expert.";

/// Build the instruction prompt for one query.
///
/// The query is embedded verbatim; nothing is escaped.
pub fn compose(query: &str) -> String {
    format!(
        "{PERSONA}\n\
         Respond in 1-2 short sentences. Only respond to real estate topics.\n\
         Query: {query}"
    )
}
