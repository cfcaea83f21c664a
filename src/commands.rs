use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Payload of an inbound message, e.g. `{"consoleCommand": "openDoor"}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandMessage {
    #[serde(default)]
    console_command: Option<Value>,
}

/// Extracts the command token from one line of input.
///
/// JSON objects are message payloads and only count when `consoleCommand`
/// is truthy. Anything else is taken as a bare token.
pub fn parse_message(line: &str) -> Option<String> {
    let line = line.trim();

    if line.is_empty() {
        return None;
    }

    if !line.starts_with('{') {
        return Some(line.to_string());
    }

    match serde_json::from_str::<CommandMessage>(line) {
        Ok(message) => message.console_command.and_then(command_token),
        Err(e) => {
            log::warn!("Ignoring malformed command message: {}", e);
            None
        }
    }
}

fn command_token(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(token) if token.is_empty() => None,
        Value::String(token) => Some(token),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Forwards command tokens read from `reader` until it hits end of input or
/// the receiving side goes away.
pub async fn read_commands<R>(reader: R, sender: mpsc::Sender<String>) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read command input")?
    {
        let Some(token) = parse_message(&line) else {
            continue;
        };

        if sender.send(token).await.is_err() {
            log::debug!("Command receiver closed, stopping input");
            break;
        }
    }

    Ok(())
}
