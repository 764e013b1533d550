//! Terminal input: reads stdin lines and turns them into chat commands.
//!
//! A line is one Enter press without modifiers. Lines are forwarded as-is
//! (blank ones included) so the controller decides what is sendable.

use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Message(String),
    Reset,
    Open,
    Close,
}

/// Interpret one line; `None` means the user wants to leave.
pub fn parse_line(line: &str) -> Option<ChatInput> {
    match line.trim() {
        "exit" | "quit" | "/exit" | "/quit" | ":q" => None,
        "/reset" => Some(ChatInput::Reset),
        "/open" => Some(ChatInput::Open),
        "/close" => Some(ChatInput::Close),
        _ => Some(ChatInput::Message(line.to_string())),
    }
}

/// Read stdin on a background task. The receiver closes on EOF or exit.
pub fn spawn_stdin_reader() -> mpsc::Receiver<ChatInput> {
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(input) = parse_line(&line) else {
                        break;
                    };
                    if tx.send(input).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF (Ctrl+D)
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });

    rx
}
