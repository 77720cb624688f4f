// Conversation logging
//
// Persists every completed exchange to SQLite and renders the log back as
// a markdown transcript.

pub mod conversation_log;
pub mod transcript;

pub use conversation_log::{ConversationLogStore, Exchange};
pub use transcript::{render, render_to_string};
