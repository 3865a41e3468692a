//! Headless session runner.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::Path;

use tc_core::prelude::*;

use crate::error::{HeadlessError, Result};
use crate::protocol::{self, Response};

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Engine configuration.
    pub state: StateConfig,
    /// Stop at the first malformed line instead of reporting and skipping it.
    pub strict: bool,
}

impl HeadlessConfig {
    /// Build the engine configuration from command-line options.
    ///
    /// A RON file provides the base; `micro` and `consider` add to it.
    /// Considered types may be given by name or numeric id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or a type is unknown.
    pub fn from_options(config: Option<&Path>, micro: bool, consider: &[String]) -> Result<Self> {
        let mut state = match config {
            Some(path) => StateConfig::load_ron(path)?,
            None => StateConfig::default(),
        };
        state.micro_battles |= micro;
        for name in consider {
            state.only_consider_types.insert(name.parse::<UnitType>()?);
        }
        Ok(Self {
            state,
            strict: false,
        })
    }
}

/// Totals reported when the input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Messages applied.
    pub messages: usize,
    /// Lines rejected.
    pub errors: usize,
}

/// Feeds decoded messages to a [`State`] and reports every update.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    state: State,
    stats: RunStats,
}

impl HeadlessRunner {
    /// Create a runner with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HeadlessConfig::default())
    }

    /// Create a runner with custom configuration.
    #[must_use]
    pub fn with_config(config: HeadlessConfig) -> Self {
        let state = State::new(config.state.clone());
        Self {
            config,
            state,
            stats: RunStats::default(),
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Totals so far.
    #[must_use]
    pub const fn stats(&self) -> RunStats {
        self.stats
    }

    /// Process one input line.
    ///
    /// Returns `Ok(None)` for blank and comment lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not a valid message.
    pub fn process_line(&mut self, line_no: usize, line: &str) -> Result<Option<Response>> {
        if protocol::is_skippable(line) {
            return Ok(None);
        }
        let message = protocol::parse_message(line.trim()).map_err(|source| HeadlessError::Json {
            line: line_no,
            source,
        })?;

        let kind = message.name();
        let tags = self.state.update(message);
        self.stats.messages += 1;
        Ok(Some(Response::update(line_no, kind, &tags, &self.state)))
    }

    /// Run until `input` is exhausted, writing one response per line to
    /// `output`.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure, or on the first malformed line in
    /// strict mode.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<RunStats> {
        tracing::info!(
            micro_battles = self.config.state.micro_battles,
            considered = self.config.state.only_consider_types.len(),
            "Starting headless session"
        );
        output.write_all(Response::ready(&self.config.state).to_json_line().as_bytes())?;

        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let response = match self.process_line(line_no, &line) {
                Ok(Some(response)) => response,
                Ok(None) => continue,
                Err(e) if !self.config.strict => {
                    tracing::warn!(line = line_no, "Rejected input: {e}");
                    self.stats.errors += 1;
                    Response::error(e.to_string(), Some(line_no))
                }
                Err(e) => return Err(e),
            };
            output.write_all(response.to_json_line().as_bytes())?;
        }

        let done = Response::Done {
            messages: self.stats.messages,
            errors: self.stats.errors,
            battles_finished: self.state.battle().battles_finished,
        };
        output.write_all(done.to_json_line().as_bytes())?;
        output.flush()?;

        tracing::info!(
            messages = self.stats.messages,
            errors = self.stats.errors,
            "Headless session finished"
        );
        Ok(self.stats)
    }

    /// Considered unit types in effect.
    #[must_use]
    pub fn considered_types(&self) -> &BTreeSet<UnitType> {
        self.state.only_consider_types()
    }
}

impl Default for HeadlessRunner {
    fn default() -> Self {
        Self::new()
    }
}
