// Command-line surface
//
// Two subcommands: `model` runs one prompt against a configured endpoint,
// `logs` prints every logged exchange as markdown.

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{DEFAULT_API_KEYS_PATH, DEFAULT_CONFIG_PATH, DEFAULT_DB_PATH};

pub mod commands;
pub mod prompt;

pub use commands::{print_logs, run_model};
pub use prompt::{generate_conversation_id, read_prompt};

/// CLI tool to interact with LLM models
#[derive(Debug, Parser)]
#[command(name = "llm", version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interact with an LLM model
    Model(ModelArgs),

    /// Print logs in Markdown format
    Logs(LogsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Model ID
    #[arg(short, long)]
    pub model_id: String,

    /// Path to the model configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Path to the API keys file
    #[arg(long, default_value = DEFAULT_API_KEYS_PATH)]
    pub api_keys: String,

    /// System prompt to be used
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// Conversation ID (generated from the current time when omitted)
    #[arg(long)]
    pub conversation_id: Option<String>,

    /// Path to the SQLite database
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    /// Seconds to wait for the connection or for the next chunk of the
    /// reply. A long answer that keeps arriving is never cut off. No limit
    /// when omitted.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Prompt text; read from stdin when empty
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub prompt: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct LogsArgs {
    /// Path to the SQLite database
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_with_trailing_prompt() {
        let cli = Cli::parse_from([
            "llm",
            "model",
            "-m",
            "gpt-x",
            "--system-prompt",
            "be terse",
            "what",
            "is",
            "--rust",
        ]);

        let Command::Model(args) = cli.command else {
            panic!("expected model command");
        };
        assert_eq!(args.model_id, "gpt-x");
        assert_eq!(args.system_prompt.as_deref(), Some("be terse"));
        assert_eq!(args.prompt, vec!["what", "is", "--rust"]);
        assert_eq!(args.db_path, DEFAULT_DB_PATH);
        assert_eq!(args.conversation_id, None);
    }

    #[test]
    fn test_parse_logs() {
        let cli = Cli::parse_from(["llm", "-v", "logs", "--db-path", "/tmp/x.db"]);
        assert_eq!(cli.verbose, 1);
        let Command::Logs(args) = cli.command else {
            panic!("expected logs command");
        };
        assert_eq!(args.db_path, "/tmp/x.db");
    }

    #[test]
    fn test_model_id_is_required() {
        assert!(Cli::try_parse_from(["llm", "model", "hello"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
