//! Bot engine
//!
//! The BotEngine is responsible for:
//! - Consuming chat messages from a MessageSource
//! - Applying access control
//! - Routing commands to the DNS handlers
//! - Sending replies through a ReplySink
//! - Flushing the registry store on shutdown
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ MessageSource │─── IncomingMessage ───┐
//! └───────────────┘                       │
//!                                         ▼
//!                                ┌──────────────┐
//!                                │  BotEngine   │
//!                                └──────────────┘
//!                                         │
//!       ┌──────────────────┬──────────────┼──────────────┬─────────────┐
//!       ▼                  ▼              ▼              ▼             ▼
//! ┌────────────┐   ┌───────────────┐ ┌───────────┐ ┌───────────┐ ┌──────────┐
//! │AccessPolicy│   │ RegistryStore │ │DnsProvider│ │ ReplySink │ │  Events  │
//! └────────────┘   └───────────────┘ └───────────┘ └───────────┘ └──────────┘
//! ```
//!
//! ## Message Flow
//!
//! 1. Parse the text; anything that is not a known command is ignored
//! 2. Run the access gates, replying with a denial if they fail
//! 3. Dispatch the command (usage text for bare invocations)
//! 4. Reply and emit an event
//!
//! Messages are handled one at a time, in arrival order.

use tokio::sync::{mpsc, oneshot};
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::access::{AccessDecision, AccessPolicy};
use crate::command::{BotCommand, CommandRouter, parse, reply};
use crate::config::BotConfig;
use crate::error::Result;
use crate::traits::{DnsProvider, IncomingMessage, MessageSource, RegistryStore, ReplySink};

/// Events emitted by the BotEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started { provider: String },

    /// A command was handled and replied to
    CommandHandled { command: BotCommand, chat_id: i64 },

    /// A message was rejected by access control
    AccessDenied { chat_id: i64 },

    /// A reply could not be delivered
    ReplyFailed { chat_id: i64, error: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// Core bot engine
///
/// ## Lifecycle
///
/// 1. Create with [`BotEngine::new()`]
/// 2. Start with [`BotEngine::run()`]
/// 3. Engine runs until a shutdown signal arrives or the message source ends
/// 4. The registry store is flushed before returning
///
/// A failed command never stops the engine; the user gets an error reply.
///
/// ## Message order
///
/// Plain text and unknown commands are dropped before access control runs,
/// so they never produce a reply, an access-denied message included. The
/// chat gate and user check apply only to the commands the bot knows. This
/// ordering is intentional.
pub struct BotEngine {
    source: Box<dyn MessageSource>,
    sink: Box<dyn ReplySink>,
    provider: Box<dyn DnsProvider>,
    registry: Box<dyn RegistryStore>,
    access: AccessPolicy,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl BotEngine {
    /// Create a new bot engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        source: Box<dyn MessageSource>,
        sink: Box<dyn ReplySink>,
        provider: Box<dyn DnsProvider>,
        registry: Box<dyn RegistryStore>,
        config: BotConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            source,
            sink,
            provider,
            registry,
            access: AccessPolicy::new(&config.access),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run until SIGINT or until the message source ends
    pub async fn run(&self) -> Result<()> {
        self.run_with_shutdown(None).await
    }

    /// Run with an explicit shutdown signal
    ///
    /// With `None`, the engine waits for Ctrl-C instead.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            provider: self.provider.provider_name().to_string(),
        });
        info!("Bot engine started (provider: {})", self.provider.provider_name());

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for shutdown signal: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        let mut messages = self.source.messages();

        let reason = loop {
            tokio::select! {
                next = messages.next() => match next {
                    Some(message) => {
                        if let Err(e) = self.handle_message(message).await {
                            error!("Failed to handle message: {}", e);
                        }
                    }
                    None => break "Message source closed",
                },

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break "Shutdown signal";
                }
            }
        };

        self.emit_event(EngineEvent::Stopped {
            reason: reason.to_string(),
        });

        self.registry.flush().await?;
        info!("Registry flushed, engine stopped");

        Ok(())
    }

    /// Handle one incoming message
    async fn handle_message(&self, message: IncomingMessage) -> Result<()> {
        let invocation = parse(&message.text);
        let Some(name) = invocation.command() else {
            return Ok(());
        };
        // Access control only sees known commands
        if BotCommand::from_name(&name).is_none() {
            debug!("Ignoring unknown command /{}", name);
            return Ok(());
        }

        let chat_id = message.chat.id;

        let denial = match self.access.check(self.registry.as_ref(), &message).await {
            Ok(AccessDecision::Allowed) => None,
            Ok(AccessDecision::Ignored) => return Ok(()),
            Ok(AccessDecision::DeniedChat) => Some(reply::access_denied_chat()),
            Ok(AccessDecision::DeniedUser) => Some(reply::access_denied_user()),
            Err(e) => {
                error!("Access check failed: {}", e);
                Some(reply::internal_error())
            }
        };

        if let Some(text) = denial {
            self.emit_event(EngineEvent::AccessDenied { chat_id });
            return self.send_reply(chat_id, &text).await;
        }

        let router = CommandRouter::new(self.provider.as_ref(), self.registry.as_ref());
        let Some((command, text)) = router.dispatch(&invocation).await else {
            return Ok(());
        };

        self.send_reply(chat_id, &text).await?;
        self.emit_event(EngineEvent::CommandHandled { command, chat_id });
        Ok(())
    }

    async fn send_reply(&self, chat_id: i64, text: &str) -> Result<()> {
        if let Err(e) = self.sink.reply(chat_id, text).await {
            self.emit_event(EngineEvent::ReplyFailed {
                chat_id,
                error: e.to_string(),
            });
            return Err(e);
        }
        Ok(())
    }

    /// Emit an engine event, dropping it when the channel is full
    fn emit_event(&self, event: EngineEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
