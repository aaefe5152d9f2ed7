//! Chat access control
//!
//! Two gates run before any command:
//!
//! 1. Chat restriction: with an allowed chat configured, only that chat and
//!    private chats get through.
//! 2. User check (private chats only): the sender must be an active
//!    registry user, matched by chat id or, failing that, by username. A
//!    username match binds the sender's chat id for next time.

use tracing::{debug, warn};

use crate::config::AccessConfig;
use crate::error::Result;
use crate::traits::registry_store::normalize_username;
use crate::traits::{ChatKind, IncomingMessage, RegistryStore};

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Handle the message
    Allowed,
    /// Chat is not allowed to use the bot
    DeniedChat,
    /// Sender is not an authorized user
    DeniedUser,
    /// Drop silently (no sender to check)
    Ignored,
}

/// Access policy built from configuration
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    allowed_chat_id: Option<i64>,
}

impl AccessPolicy {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            allowed_chat_id: config.allowed_chat_id,
        }
    }

    /// Chat restriction gate
    pub fn chat_allowed(&self, message: &IncomingMessage) -> bool {
        match self.allowed_chat_id {
            None => true,
            Some(allowed) => message.chat.id == allowed || message.chat.kind == ChatKind::Private,
        }
    }

    /// Run both gates
    pub async fn check(
        &self,
        registry: &dyn RegistryStore,
        message: &IncomingMessage,
    ) -> Result<AccessDecision> {
        if !self.chat_allowed(message) {
            warn!("Rejected message from chat {}", message.chat.id);
            return Ok(AccessDecision::DeniedChat);
        }

        // Group chats passed the chat gate; users are only checked in private
        if message.chat.kind != ChatKind::Private {
            return Ok(AccessDecision::Allowed);
        }

        let Some(sender) = &message.sender else {
            return Ok(AccessDecision::Ignored);
        };

        if registry
            .find_active_user_by_telegram_id(sender.id)
            .await?
            .is_some()
        {
            return Ok(AccessDecision::Allowed);
        }

        let username = sender
            .username
            .as_deref()
            .map(normalize_username)
            .filter(|u| !u.is_empty());

        if let Some(username) = username
            && let Some(user) = registry.find_active_user_by_username(&username).await?
        {
            registry.bind_telegram_id(&user.username, sender.id).await?;
            debug!("Bound chat id {} to user {}", sender.id, user.username);
            return Ok(AccessDecision::Allowed);
        }

        warn!("Rejected unknown user {}", sender.id);
        Ok(AccessDecision::DeniedUser)
    }
}
