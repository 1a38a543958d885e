//! # Sutekh Architecture
//!
//! Sutekh manages a card catalog for Vampire: The Eternal Struggle and the
//! card sets (collections, decks, binders) built from it. This crate is the
//! **UI-agnostic core**; the `sutekh` binary is one client of it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Resolves names to ids, owns the lookup cache             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Card set operations, each in one transaction             │
//! │  - Returns CmdResult with affected card sets and messages   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Domain (graph, holder, filters, tabulator, grouping)       │
//! │  - Card set hierarchy, import staging, queries, analysis    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Schema + Storage (schema/, store/)                         │
//! │  - Tables, mapping tables, selection conditions             │
//! │  - DataStore trait, file and in-memory backends             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout or stderr and never
//! prompts. Interactive choices (picking a card for an unrecognised name) are
//! injected as a [`lookup::CardLookup`] implementation.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Card set operations
//! - [`graph`]: Parent links between card sets: children, loops, repair
//! - [`holder`]: Staging area that turns named entries into a card set
//! - [`lookup`] and [`cache`]: Card name resolution for imports
//! - [`filters`]: The filter algebra and its user-facing vocabulary
//! - [`tabulator`]: Numeric feature tables over card lists
//! - [`grouping`]: Grouping card lists for display
//! - [`schema`]: Catalog and card set tables
//! - [`store`]: Storage abstraction and transactions
//! - [`model`]: Row types and name normalisation
//! - [`config`] and [`init`]: Configuration and startup
//! - [`error`]: Error types

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod filters;
pub mod graph;
pub mod grouping;
pub mod holder;
pub mod init;
pub mod lookup;
pub mod model;
pub mod schema;
pub mod store;
pub mod tabulator;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
