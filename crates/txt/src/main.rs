//! # txt CLI
//!
//! The binary is thin on purpose: the CLI lives in `src/cli/`, this file only
//! calls `cli::run()` and turns an error into an exit code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/txt/src/cli/)                            │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - settings, logging, dispatch (commands.rs)                │
//! │  - terminal and JSON output (render.rs)                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/txtapp/src/api.rs)                       │
//! │  - Resolves T1 / alias / ID tokens                          │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (crates/txtapp/src/store/)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward never touches the terminal. The CLI owns
//! argument parsing, logging setup, rendering and exit codes.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
