// Markdown transcript rendering

use std::io::{self, Write};

use super::conversation_log::Exchange;

/// Header text for rows stored without a timestamp
const MISSING_TIMESTAMP: &str = "unknown time";

/// Write one markdown block per exchange, in the order given.
pub fn render<W: Write + ?Sized>(exchanges: &[Exchange], sink: &mut W) -> io::Result<()> {
    for exchange in exchanges {
        render_exchange(exchange, sink)?;
    }
    sink.flush()
}

fn render_exchange<W: Write + ?Sized>(exchange: &Exchange, sink: &mut W) -> io::Result<()> {
    writeln!(
        sink,
        "# {} conversation: \t{}\n",
        exchange.created_at.as_deref().unwrap_or(MISSING_TIMESTAMP),
        exchange.conversation_id
    )?;
    writeln!(sink, " Model: **{}**\n", exchange.model_name)?;
    writeln!(sink, "## Prompt:\n")?;
    writeln!(sink, "{}", exchange.prompt)?;
    writeln!(sink, "\n## Response:\n")?;
    writeln!(sink, "{}", exchange.answer)?;
    writeln!(sink, "\n---\n")
}

/// Render into a string
pub fn render_to_string(exchanges: &[Exchange]) -> io::Result<String> {
    let mut out = Vec::new();
    render(exchanges, &mut out)?;
    String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
