//! Console chat transport
//!
//! Reads commands from stdin, one per line, as private messages from a
//! single configured user, and writes replies to stdout.

use async_trait::async_trait;
use dnsbot_core::traits::{IncomingMessage, MessageSource, ReplySink};
use std::pin::Pin;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

/// Stdin lines as private messages from one user
pub struct ConsoleMessageSource {
    user_id: i64,
    username: String,
}

impl ConsoleMessageSource {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

impl MessageSource for ConsoleMessageSource {
    fn messages(&self) -> Pin<Box<dyn Stream<Item = IncomingMessage> + Send + 'static>> {
        let user_id = self.user_id;
        let username = self.username.clone();
        let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());

        Box::pin(lines.filter_map(move |line| match line {
            Ok(text) if text.trim().is_empty() => None,
            Ok(text) => Some(IncomingMessage::private(user_id, Some(&username), text)),
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                None
            }
        }))
    }
}

/// Replies printed to stdout
pub struct StdoutReplySink;

#[async_trait]
impl ReplySink for StdoutReplySink {
    async fn reply(&self, chat_id: i64, text: &str) -> dnsbot_core::Result<()> {
        let mut stdout = tokio::io::stdout();
        let rendered = format!("[chat {}]\n{}\n\n", chat_id, text);
        stdout.write_all(rendered.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}
