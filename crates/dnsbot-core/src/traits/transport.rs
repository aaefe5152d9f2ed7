// # Transport Traits
//
// Defines the interface between the bot engine and whatever delivers chat
// messages.
//
// ## Implementations
//
// - Console (stdin/stdout): `dnsbotd`
//
// The engine never looks at transport envelopes beyond what is modelled
// here: the chat, the sender, and the raw message text.
//
// ## Usage
//
// ```rust,ignore
// use dnsbot_core::{MessageSource, ReplySink};
// use tokio_stream::StreamExt;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* MessageSource implementation */;
//     let sink = /* ReplySink implementation */;
//
//     let mut messages = source.messages();
//     while let Some(message) = messages.next().await {
//         sink.reply(message.chat.id, &format!("echo: {}", message.text)).await?;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

/// Kind of chat a message arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatKind {
    /// One-to-one conversation with the bot
    Private,
    /// Group, supergroup or channel
    Group,
}

/// Chat a message arrived in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    pub kind: ChatKind,
}

/// Author of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    /// Chat platform user id
    pub id: i64,
    /// Username without the leading `@`, if the user has one
    pub username: Option<String>,
}

/// One incoming chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub sender: Option<Sender>,
    /// Full message text, including the leading `/command`
    pub text: String,
}

impl IncomingMessage {
    /// Message from a user in a private chat (chat id = user id)
    pub fn private(user_id: i64, username: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            chat: Chat {
                id: user_id,
                kind: ChatKind::Private,
            },
            sender: Some(Sender {
                id: user_id,
                username: username.map(str::to_string),
            }),
            text: text.into(),
        }
    }

    /// Message from a user in a group chat
    pub fn group(chat_id: i64, user_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat: Chat {
                id: chat_id,
                kind: ChatKind::Group,
            },
            sender: Some(Sender {
                id: user_id,
                username: None,
            }),
            text: text.into(),
        }
    }
}

/// Source of incoming chat messages
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Stream of incoming messages
    ///
    /// The stream ends when the transport closes. Dropping it must release
    /// the transport's resources.
    fn messages(&self) -> Pin<Box<dyn Stream<Item = IncomingMessage> + Send + 'static>>;
}

/// Where replies go
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Send `text` to `chat_id`
    async fn reply(&self, chat_id: i64, text: &str) -> Result<(), crate::Error>;
}
