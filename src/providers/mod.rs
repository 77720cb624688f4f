// Chat provider abstraction
//
// A provider turns one ChatRequest into an ordered channel of fragments.
// The OpenAI-compatible HTTP transport is the only production
// implementation; tests substitute scripted providers.

use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;

use crate::errors::Result;

pub mod openai;
pub mod types;

pub use openai::OpenAIProvider;
pub use types::{ChatMessage, ChatRequest, Fragment};

/// Trait for chat-completion endpoints
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Issue the request and return a channel of fragments.
    ///
    /// Fragments arrive in the order the endpoint produced them. The channel
    /// closes when the endpoint signals completion; a transport failure after
    /// the request was accepted is delivered as an `Err` item.
    async fn send_chat_stream(&self, request: &ChatRequest) -> Result<Receiver<Result<Fragment>>>;

    /// Provider name for diagnostics
    fn name(&self) -> &str;
}
