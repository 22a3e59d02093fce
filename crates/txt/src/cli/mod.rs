//! # CLI Behavior
//!
//! This is **one possible client** for txt, not the application itself.
//!
//! ### Naked Execution (`txt`)
//!
//! Running `txt` with no arguments lists the newest temporary messages.
//!
//! ### Adding
//!
//! `txt add some words` stores `some words`. With no words, the message is
//! read from stdin, so `pbpaste | txt add` works. Adding the same text as
//! the newest temporary message is reported and skipped.
//!
//! ### Addressing Messages
//!
//! Every command that takes a `TOKEN` accepts a short index (`T1`, `p3`),
//! an alias or a full ID.
//!
//! ### Output
//!
//! `--json` prints the raw `CmdResult` instead of the human rendering.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap
//! - `commands`: settings, logging, dispatch to the API
//! - `render`: terminal and JSON output

mod commands;
mod render;
pub mod setup;

pub use commands::run;
