//! Chat command handling
//!
//! - [`parser`]: raw text → [`CommandInvocation`]
//! - [`dns`]: record create/update/delete/list handlers
//! - [`reply`]: usage and result texts
//!
//! [`CommandRouter::dispatch`] ties them together. For every mutating
//! command a bare invocation shows usage, anything else executes.

pub mod dns;
pub mod parser;
pub mod reply;

pub use dns::{DnsCommands, RecordChange, RecordDeletion, RecordListing};
pub use parser::{CommandInvocation, parse};

use tracing::error;

use crate::traits::{DnsProvider, RegistryStore};

/// Commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotCommand {
    Start,
    Help,
    ListDomains,
    ListDns,
    CreateDns,
    UpdateDns,
    DeleteDns,
}

impl BotCommand {
    /// Look up a command by name (without `/`, lowercase)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "listdomains" => Some(Self::ListDomains),
            "listdns" => Some(Self::ListDns),
            "createdns" => Some(Self::CreateDns),
            "updatedns" => Some(Self::UpdateDns),
            "deletedns" => Some(Self::DeleteDns),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::ListDomains => "listdomains",
            Self::ListDns => "listdns",
            Self::CreateDns => "createdns",
            Self::UpdateDns => "updatedns",
            Self::DeleteDns => "deletedns",
        }
    }
}

/// Routes parsed commands to their handlers and renders the reply
pub struct CommandRouter<'a> {
    commands: DnsCommands<'a>,
}

impl<'a> CommandRouter<'a> {
    pub fn new(provider: &'a dyn DnsProvider, registry: &'a dyn RegistryStore) -> Self {
        Self {
            commands: DnsCommands::new(provider, registry),
        }
    }

    /// Handle one message
    ///
    /// Returns the command and its reply text, or `None` when the text is
    /// not a known command.
    pub async fn dispatch(&self, invocation: &CommandInvocation) -> Option<(BotCommand, String)> {
        let command = BotCommand::from_name(&invocation.command()?)?;
        let args = invocation.args();

        let result = match command {
            BotCommand::Start | BotCommand::Help => Ok(reply::welcome()),
            BotCommand::ListDomains => self
                .commands
                .list_domains()
                .await
                .map(|domains| reply::domain_list(&domains)),
            BotCommand::ListDns if !invocation.has_arguments() => Ok(reply::list_records_usage()),
            BotCommand::ListDns => self
                .commands
                .list_records(args)
                .await
                .map(|listing| reply::record_list(&listing)),
            BotCommand::CreateDns if !invocation.has_arguments() => Ok(reply::create_usage()),
            BotCommand::CreateDns => self
                .commands
                .create(args)
                .await
                .map(|change| reply::created(&change)),
            BotCommand::UpdateDns if !invocation.has_arguments() => Ok(reply::update_usage()),
            BotCommand::UpdateDns => self
                .commands
                .update(args)
                .await
                .map(|change| reply::updated(&change)),
            BotCommand::DeleteDns if !invocation.has_arguments() => Ok(reply::delete_usage()),
            BotCommand::DeleteDns => self
                .commands
                .delete(args)
                .await
                .map(|deletion| reply::deleted(&deletion)),
        };

        let text = result.unwrap_or_else(|e| {
            error!("/{} failed: {}", command.name(), e);
            reply::failure(&e)
        });

        Some((command, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_round_trip() {
        for command in [
            BotCommand::Start,
            BotCommand::Help,
            BotCommand::ListDomains,
            BotCommand::ListDns,
            BotCommand::CreateDns,
            BotCommand::UpdateDns,
            BotCommand::DeleteDns,
        ] {
            assert_eq!(BotCommand::from_name(command.name()), Some(command));
        }
        assert_eq!(BotCommand::from_name("registerdomain"), None);
    }
}
