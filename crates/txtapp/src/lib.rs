//! # txt Architecture
//!
//! txt is a single-user note/clipboard store. Short messages go into a
//! **temporary** bucket that works like a clipboard history (capped, oldest
//! dropped first); anything worth keeping is moved to the **permanent** bucket.
//! Messages are addressed by date ID, by a short display index (`T1`, `P3`) or
//! by a user-chosen alias.
//!
//! Like padz before it, this is a library that happens to have a CLI client.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Clients (the `txt` CLI, an HTTP front end, ...)            │
//! │  - Parse input, render output, own auth and sessions        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade, returns structured `CmdResult` values       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - redb tables: temporary, permanent, aliases, config       │
//! │  - One write transaction per operation                      │
//! │  - Dedupe, eviction, re-keying, alias and index upkeep      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! The library never prints and never exits. It logs through `tracing` and
//! leaves installing a subscriber to the binary.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`store`]: The storage engine
//! - [`model`]: Core data types (`TxtMsg`, `Config`, `Category`, `Bucket`)
//! - [`index`]: Short index grammar and alias validation
//! - [`id`]: Date ID generation and UTC offsets
//! - [`settings`]: Process settings (data directory, log filter)
//! - [`error`]: Error types

pub mod api;
pub mod error;
pub mod id;
pub mod index;
pub mod model;
pub mod settings;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;
