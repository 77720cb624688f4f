// Subcommand handlers
//
// Handlers take their input and output streams as parameters so the same
// code serves the binary (stdin/stdout) and the tests.

use std::io::{Read, Write};
use std::time::Duration;

use tracing::{debug, info};

use super::prompt::{generate_conversation_id, read_prompt};
use super::{LogsArgs, ModelArgs};
use crate::config::{expand_home, load_api_keys, load_model_configs, resolve, resolve_key};
use crate::errors::Result;
use crate::logging::{render, ConversationLogStore};
use crate::streaming::{stream_answer, FinishedAnswer};

/// Run one prompt against the configured model and log the exchange.
///
/// Fails without contacting the endpoint when the model id, its key or the
/// prompt is missing. Nothing is logged unless the answer completed.
pub async fn run_model<R: Read, W: Write + ?Sized>(
    args: &ModelArgs,
    stdin: R,
    out: &mut W,
) -> Result<FinishedAnswer> {
    let store = ConversationLogStore::new(expand_home(&args.db_path));
    store.initialize()?;

    let configs = load_model_configs(&expand_home(&args.config))?;
    let keys = load_api_keys(&expand_home(&args.api_keys))?;

    let config = resolve(&args.model_id, &configs)?;
    let api_key = resolve_key(config, &keys)?;
    debug!("Resolved {} -> {} at {}", config.model_id, config.model_name, config.api_base);

    let prompt = read_prompt(&args.prompt, stdin)?;
    let conversation_id = args
        .conversation_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_conversation_id);

    let timeout = args.timeout.map(Duration::from_secs);
    let answer = stream_answer(
        config,
        &prompt,
        args.system_prompt.as_deref(),
        api_key,
        timeout,
        out,
    )
    .await?;

    let id = store.append(&conversation_id, &config.model_name, &prompt, &answer.text)?;
    info!("Exchange {} logged under conversation {}", id, conversation_id);

    Ok(answer)
}

/// Print the whole log, newest first. Returns the number of exchanges.
pub fn print_logs<W: Write + ?Sized>(args: &LogsArgs, out: &mut W) -> Result<usize> {
    let store = ConversationLogStore::new(expand_home(&args.db_path));
    let exchanges = store.list_all()?;
    render(&exchanges, out)?;
    Ok(exchanges.len())
}
