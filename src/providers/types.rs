// Provider-agnostic request and fragment types

use serde::Serialize;

/// One role/content message in a chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completion request body.
///
/// Serializes directly into the OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build a single-turn request: optional system message, then the prompt.
    pub fn new(model: &str, prompt: &str, system_prompt: Option<&str>, stream: bool) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        Self {
            model: model.to_string(),
            messages,
            stream,
        }
    }
}

/// One incremental unit of generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Chain-of-thought text from reasoning models
    Reasoning(String),
    /// Answer text
    Content(String),
}

impl Fragment {
    /// Split a stream delta into fragments, reasoning before content.
    /// Empty fields are dropped.
    pub fn from_delta(reasoning: Option<String>, content: Option<String>) -> Vec<Self> {
        let reasoning = reasoning.filter(|r| !r.is_empty()).map(Self::Reasoning);
        let content = content.filter(|c| !c.is_empty()).map(Self::Content);
        reasoning.into_iter().chain(content).collect()
    }

    /// Join a complete reply into one fragment, reasoning first. The result
    /// counts as content whenever the reply carries any answer text.
    pub fn whole(reasoning: Option<String>, content: Option<String>) -> Option<Self> {
        let reasoning = reasoning.unwrap_or_default();
        let content = content.unwrap_or_default();
        match (reasoning.is_empty(), content.is_empty()) {
            (true, true) => None,
            (false, true) => Some(Self::Reasoning(reasoning)),
            _ => Some(Self::Content(reasoning + &content)),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Reasoning(text) | Self::Content(text) => text,
        }
    }

    pub fn is_reasoning(&self) -> bool {
        matches!(self, Self::Reasoning(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_with_system_prompt() {
        let request = ChatRequest::new("gpt-4o-mini", "hello", Some("be terse"), true);
        assert_eq!(
            request.messages,
            vec![ChatMessage::system("be terse"), ChatMessage::user("hello")]
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_request_without_system_prompt() {
        let request = ChatRequest::new("m", "hello", None, false);
        assert_eq!(request.messages, vec![ChatMessage::user("hello")]);
        assert_eq!(serde_json::to_value(&request).unwrap()["stream"], false);
    }

    #[test]
    fn test_fragment_classification() {
        assert_eq!(
            Fragment::from_delta(Some("think".into()), None),
            vec![Fragment::Reasoning("think".into())]
        );
        assert_eq!(
            Fragment::from_delta(Some(String::new()), Some("say".into())),
            vec![Fragment::Content("say".into())]
        );
        assert!(Fragment::from_delta(None, Some(String::new())).is_empty());
        assert!(Fragment::from_delta(None, None).is_empty());
    }

    #[test]
    fn test_delta_with_both_fields_yields_both() {
        assert_eq!(
            Fragment::from_delta(Some("think ".into()), Some("say".into())),
            vec![Fragment::Reasoning("think ".into()), Fragment::Content("say".into())]
        );
    }

    #[test]
    fn test_whole_reply_joins_reasoning_first() {
        assert_eq!(
            Fragment::whole(Some("think ".into()), Some("say".into())),
            Some(Fragment::Content("think say".into()))
        );
        assert_eq!(
            Fragment::whole(Some("think".into()), None),
            Some(Fragment::Reasoning("think".into()))
        );
        assert_eq!(
            Fragment::whole(None, Some("say".into())),
            Some(Fragment::Content("say".into()))
        );
        assert_eq!(Fragment::whole(Some(String::new()), None), None);
    }
}
