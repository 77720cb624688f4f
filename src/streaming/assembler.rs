// Streaming answer assembler
//
// Drives one request against a ChatProvider, echoes every fragment to the
// output sink as soon as it arrives and folds all fragment text (reasoning
// and content alike) into one answer string.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::ModelEndpointConfig;
use crate::errors::Result;
use crate::providers::{ChatProvider, ChatRequest, OpenAIProvider};

/// Lifecycle of one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    Idle,
    Requesting,
    Streaming,
    /// Terminal success
    Completed,
    /// Terminal error
    Failed,
}

/// The accumulated answer of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedAnswer {
    pub text: String,
    /// Non-empty fragments received
    pub fragment_count: usize,
    /// How many of those were reasoning text
    pub reasoning_fragments: usize,
}

pub struct StreamingAnswerAssembler<'a, P: ChatProvider + ?Sized> {
    provider: &'a P,
    state: AssemblerState,
}

impl<'a, P: ChatProvider + ?Sized> StreamingAnswerAssembler<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            state: AssemblerState::Idle,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Run one exchange, writing fragments to `sink` unbuffered.
    ///
    /// On success a single newline terminates the streamed output. On
    /// failure the assembler ends in `Failed` and the partial answer is
    /// discarded.
    pub async fn run<W: Write + ?Sized>(
        &mut self,
        config: &ModelEndpointConfig,
        prompt: &str,
        system_prompt: Option<&str>,
        sink: &mut W,
    ) -> Result<FinishedAnswer> {
        match self.drive(config, prompt, system_prompt, sink).await {
            Ok(answer) => {
                self.state = AssemblerState::Completed;
                debug!(
                    "Exchange completed: {} fragments, {} chars",
                    answer.fragment_count,
                    answer.text.len()
                );
                Ok(answer)
            }
            Err(e) => {
                warn!("Exchange failed in state {:?}: {}", self.state, e);
                self.state = AssemblerState::Failed;
                Err(e)
            }
        }
    }

    async fn drive<W: Write + ?Sized>(
        &mut self,
        config: &ModelEndpointConfig,
        prompt: &str,
        system_prompt: Option<&str>,
        sink: &mut W,
    ) -> Result<FinishedAnswer> {
        self.state = AssemblerState::Requesting;
        let request = ChatRequest::new(
            &config.model_name,
            prompt,
            system_prompt,
            config.supports_streaming,
        );
        debug!(
            "Requesting {} via {} (stream={})",
            request.model,
            self.provider.name(),
            request.stream
        );

        let mut rx = self.provider.send_chat_stream(&request).await?;
        self.state = AssemblerState::Streaming;

        let mut answer = FinishedAnswer {
            text: String::new(),
            fragment_count: 0,
            reasoning_fragments: 0,
        };

        while let Some(item) = rx.recv().await {
            let fragment = item?;
            let text = fragment.text();
            if text.is_empty() {
                continue;
            }

            sink.write_all(text.as_bytes())?;
            sink.flush()?;

            answer.text.push_str(text);
            answer.fragment_count += 1;
            if fragment.is_reasoning() {
                answer.reasoning_fragments += 1;
            }
        }

        sink.write_all(b"\n")?;
        sink.flush()?;

        Ok(answer)
    }
}

/// Build the HTTP provider for `config` and run one exchange against it.
pub async fn stream_answer<W: Write + ?Sized>(
    config: &ModelEndpointConfig,
    prompt: &str,
    system_prompt: Option<&str>,
    api_key: &str,
    idle_timeout: Option<Duration>,
    sink: &mut W,
) -> Result<FinishedAnswer> {
    let provider = OpenAIProvider::from_config(config, api_key, idle_timeout)?;
    StreamingAnswerAssembler::new(&provider)
        .run(config, prompt, system_prompt, sink)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LlmError;
    use crate::providers::Fragment;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Replays a fixed script of fragments and remembers the request
    struct ScriptedProvider {
        script: Vec<Result<Fragment>>,
        reject: bool,
        seen: Mutex<Option<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<Fragment>>) -> Self {
            Self {
                script,
                reject: false,
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn send_chat_stream(
            &self,
            request: &ChatRequest,
        ) -> Result<mpsc::Receiver<Result<Fragment>>> {
            *self.seen.lock().unwrap() = Some(request.clone());
            if self.reject {
                return Err(LlmError::Transport("connection refused".to_string()));
            }

            let (tx, rx) = mpsc::channel(self.script.len().max(1));
            for item in &self.script {
                let item = match item {
                    Ok(fragment) => Ok(fragment.clone()),
                    Err(e) => Err(LlmError::Transport(e.to_string())),
                };
                tx.send(item).await.unwrap();
            }
            Ok(rx)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Records each write separately
    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<String>,
        flushes: usize,
    }

    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes.push(String::from_utf8_lossy(buf).into_owned());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    fn config(stream: bool) -> ModelEndpointConfig {
        ModelEndpointConfig {
            model_id: "gpt-x".to_string(),
            model_name: "gpt-4o-mini".to_string(),
            api_base: "https://api.example.com".to_string(),
            supports_streaming: stream,
            api_key_name: "default".to_string(),
        }
    }

    fn content(text: &str) -> Result<Fragment> {
        Ok(Fragment::Content(text.to_string()))
    }

    #[tokio::test]
    async fn test_fragments_concatenate_in_order() {
        let provider = ScriptedProvider::new(vec![content("Hi"), content(" there")]);
        let mut sink = RecordingSink::default();
        let mut assembler = StreamingAnswerAssembler::new(&provider);
        assert_eq!(assembler.state(), AssemblerState::Idle);

        let answer = assembler.run(&config(true), "hello", None, &mut sink).await.unwrap();

        assert_eq!(answer.text, "Hi there");
        assert_eq!(answer.fragment_count, 2);
        assert_eq!(sink.writes, vec!["Hi", " there", "\n"]);
        assert_eq!(sink.flushes, 3);
        assert_eq!(assembler.state(), AssemblerState::Completed);

        let seen = provider.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.model, "gpt-4o-mini");
        assert!(seen.stream);
    }

    #[tokio::test]
    async fn test_reasoning_and_content_are_folded_together() {
        let provider = ScriptedProvider::new(vec![
            Ok(Fragment::Reasoning("Let me think. ".to_string())),
            content("42"),
        ]);
        let mut sink = RecordingSink::default();

        let answer = StreamingAnswerAssembler::new(&provider)
            .run(&config(true), "q", None, &mut sink)
            .await
            .unwrap();

        assert_eq!(answer.text, "Let me think. 42");
        assert_eq!(answer.reasoning_fragments, 1);
        assert_eq!(sink.writes, vec!["Let me think. ", "42", "\n"]);
    }

    #[tokio::test]
    async fn test_empty_fragments_are_not_written() {
        let provider = ScriptedProvider::new(vec![content(""), content("a"), content("")]);
        let mut sink = RecordingSink::default();

        let answer = StreamingAnswerAssembler::new(&provider)
            .run(&config(false), "q", Some("sys"), &mut sink)
            .await
            .unwrap();

        assert_eq!(answer.text, "a");
        assert_eq!(answer.fragment_count, 1);
        assert_eq!(sink.writes, vec!["a", "\n"]);

        let seen = provider.seen.lock().unwrap().clone().unwrap();
        assert!(!seen.stream);
        assert_eq!(seen.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_no_fragments_yields_empty_answer() {
        let provider = ScriptedProvider::new(vec![]);
        let mut sink = RecordingSink::default();

        let answer = StreamingAnswerAssembler::new(&provider)
            .run(&config(true), "q", None, &mut sink)
            .await
            .unwrap();

        assert_eq!(answer.text, "");
        assert_eq!(sink.writes, vec!["\n"]);
    }

    #[tokio::test]
    async fn test_mid_stream_error_fails() {
        let provider = ScriptedProvider::new(vec![
            content("partial"),
            Err(LlmError::Transport("reset by peer".to_string())),
            content("never"),
        ]);
        let mut sink = RecordingSink::default();
        let mut assembler = StreamingAnswerAssembler::new(&provider);

        let err = assembler.run(&config(true), "q", None, &mut sink).await.unwrap_err();

        assert!(matches!(err, LlmError::Transport(msg) if msg.contains("reset by peer")));
        assert_eq!(assembler.state(), AssemblerState::Failed);
        // Output already shown stays shown, but no terminator is written
        assert_eq!(sink.writes, vec!["partial"]);
    }

    #[tokio::test]
    async fn test_rejected_request_fails_before_streaming() {
        let mut provider = ScriptedProvider::new(vec![content("x")]);
        provider.reject = true;
        let mut sink = RecordingSink::default();
        let mut assembler = StreamingAnswerAssembler::new(&provider);

        assert!(assembler.run(&config(true), "q", None, &mut sink).await.is_err());
        assert_eq!(assembler.state(), AssemblerState::Failed);
        assert!(sink.writes.is_empty());
    }
}
