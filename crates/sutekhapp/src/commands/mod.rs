//! # Command Layer
//!
//! The card set operations of sutekh. Each command lives in its own submodule
//! and is a plain function over a [`DataStore`](crate::store::DataStore).
//!
//! ## Role and Responsibilities
//!
//! - Implement the actual logic for each operation on ids and domain types
//! - Run every change inside [`transaction`](crate::store::transaction), so a
//!   failed operation leaves the stored data untouched
//! - Return a structured [`CmdResult`] with the affected card sets and messages
//!
//! Commands never print, prompt or parse arguments. Names are resolved to ids
//! by the API facade before a command runs.
//!
//! ## Warnings
//!
//! Operations that partially succeed (an import with unknown cards, a catalog
//! refresh that drops memberships) report the problems as
//! [`MessageLevel::Warning`] messages. A warning never means the operation
//! failed; failures are `Err`.
//!
//! ## Command Modules
//!
//! - [`create`]: Create an empty card set
//! - [`update`]: Change metadata, add or remove card copies
//! - [`reparent`]: Move card sets in the hierarchy
//! - [`delete`]: Delete check and deletion
//! - [`repair`]: Break existing parent loops
//! - [`import`]: Commit a holder with a name-clash policy, read deck lists
//! - [`from_filter`]: Card set from a filter selection
//! - [`independence`]: Can a parent supply all its children at once
//! - [`catalog`]: Refresh the catalog, keeping card set contents
//! - [`list`]: Card set tree and contents

use crate::model::CardSet;
use serde::Serialize;

pub mod catalog;
pub mod create;
pub mod delete;
pub mod from_filter;
pub mod import;
pub mod independence;
pub mod list;
pub mod reparent;
pub mod repair;
pub mod update;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Card sets created or changed, as stored after the operation.
    pub affected_card_sets: Vec<CardSet>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_card_sets(mut self, card_sets: Vec<CardSet>) -> Self {
        self.affected_card_sets = card_sets;
        self
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> + '_ {
        self.messages
            .iter()
            .filter(|m| m.level == MessageLevel::Warning)
            .map(|m| m.content.as_str())
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}
