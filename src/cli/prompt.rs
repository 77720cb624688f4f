// Prompt sourcing and conversation ids

use chrono::{DateTime, Local};
use std::io::Read;

use crate::config::constants::CONVERSATION_ID_FORMAT;
use crate::errors::{LlmError, Result};

/// Join trailing arguments with spaces, or fall back to trimmed stdin.
pub fn read_prompt<R: Read>(args: &[String], mut stdin: R) -> Result<String> {
    let prompt = if args.is_empty() {
        let mut buf = String::new();
        stdin.read_to_string(&mut buf)?;
        buf.trim().to_string()
    } else {
        args.join(" ")
    };

    if prompt.trim().is_empty() {
        return Err(LlmError::EmptyPrompt);
    }
    Ok(prompt)
}

/// Sortable id from local time, e.g. `20240501123045123456`.
///
/// Two calls within the same microsecond collide; ids are only weakly unique.
pub fn generate_conversation_id() -> String {
    conversation_id_at(Local::now())
}

fn conversation_id_at(now: DateTime<Local>) -> String {
    now.format(CONVERSATION_ID_FORMAT).to_string()
}
