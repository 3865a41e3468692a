//! Headless driver for the state engine.
//!
//! Reads already-decoded engine messages as JSON lines, applies them to a
//! [`State`](tc_core::state::State), and writes one JSON response per
//! message with the update tags and a summary of the session. This enables:
//!
//! - **Replay inspection**: Step through a recorded message log
//! - **Bot debugging**: Watch unit lifecycle and battle events as they happen
//! - **CI verification**: Check recorded sessions against expected outcomes
//!
//! # Protocol
//!
//! - **stdin** (or `--input`): one message per line
//! - **stdout**: responses (JSON)
//! - **stderr**: logs (human-readable)
//!
//! See [`protocol`] module for the full message/response format.
//!
//! # Example
//!
//! ```bash
//! # Micro-battle session considering marines
//! cargo run -p tc_headless -- --micro --consider Terran_Marine --input session.jsonl
//!
//! # Configuration from a RON file
//! cargo run -p tc_headless -- --config micro.ron < session.jsonl
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod protocol;
pub mod runner;

pub use error::{HeadlessError, Result};
pub use protocol::{PlayerUnits, Response, StateSummary};
pub use runner::{HeadlessConfig, HeadlessRunner, RunStats};
