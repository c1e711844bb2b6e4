//! Interactive consumers of the engine: input gate, run history and
//! playback, tied together by [`Session`].
//!
//! None of these feed anything back into [`simulate`]; the engine stays
//! stateless and the session owns everything that outlives a single run.
//!
//! # Example
//!
//! ```
//! use bracket_pda::session::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.submit("([])").unwrap();
//!
//! let playback = session.playback_mut().unwrap();
//! while playback.step_forward() {}
//! assert!(playback.is_accepted());
//! assert_eq!(session.history().len(), 1);
//! ```

pub mod gate;
pub mod history;
pub mod playback;

pub use gate::InputGate;
pub use history::{History, HistoryEntry, DEFAULT_HISTORY_CAPACITY};
#[cfg(feature = "autoplay")]
pub use playback::autoplay;
pub use playback::Playback;

use crate::builder::impl_builder;
use crate::engine::simulate;
use crate::error::{BuilderError, GateError};
use crate::trace::Trace;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for an interactive [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SessionConfig {
    /// Delay between steps during autoplay (default: 800 ms).
    pub playback_interval: Duration,

    /// Number of runs kept in history (default: 10).
    pub history_capacity: usize,

    /// Strip surrounding whitespace from submitted input (default: true).
    pub trim_input: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            playback_interval: Duration::from_millis(800),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            trim_input: true,
        }
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<(), BuilderError> {
        if self.playback_interval.is_zero() {
            return Err(BuilderError::InvalidValue {
                builder: "SessionConfigBuilder",
                field: "playback_interval",
                reason: "must be greater than zero".into(),
            });
        }
        if self.history_capacity == 0 {
            return Err(BuilderError::InvalidValue {
                builder: "SessionConfigBuilder",
                field: "history_capacity",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl_builder!(SessionConfig, SessionConfigBuilder {
    required {}
    optional {
        playback_interval: Duration,
        history_capacity: usize,
        trim_input: bool,
    }
});

/// Gate, simulate, play back and remember runs.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    gate: InputGate,
    history: History,
    playback: Option<Playback>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            gate: InputGate::new(config.trim_input),
            history: History::with_capacity(config.history_capacity),
            playback: None,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Change the autoplay delay. Takes effect on the next [`Session::autoplay`].
    pub fn set_playback_interval(&mut self, interval: Duration) -> Result<(), BuilderError> {
        let config = SessionConfig {
            playback_interval: interval,
            ..self.config.clone()
        };
        config.validate()?;
        debug!(?interval, "Playback interval changed");
        self.config = config;
        Ok(())
    }

    /// Simulate `raw` after it passes the gate.
    ///
    /// Replaces the current playback with a paused one at step 0 and
    /// records the outcome in history. A refused input changes nothing.
    pub fn submit(&mut self, raw: &str) -> Result<&Trace, GateError> {
        let input = self.gate.sanitize(raw)?;
        let trace = simulate(&input);
        info!(input = %input, accepted = trace.is_accepted(), steps = trace.len(), "Submitted input");

        self.history.record(&trace);
        let playback = self.playback.insert(Playback::new(trace));
        Ok(playback.trace())
    }

    /// Re-run the input of history entry `index` (0 = most recent).
    pub fn rerun(&mut self, index: usize) -> Result<&Trace, GateError> {
        let input = self
            .history
            .get(index)
            .map(|entry| entry.input.clone())
            .ok_or(GateError::NoSuchEntry {
                index,
                len: self.history.len(),
            })?;
        self.submit(&input)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    pub fn playback_mut(&mut self) -> Option<&mut Playback> {
        self.playback.as_mut()
    }

    /// Autoplay the current trace at the configured interval.
    ///
    /// See [`autoplay`] for pausing from `on_step` and cancellation.
    #[cfg(feature = "autoplay")]
    pub async fn autoplay<F>(&mut self, on_step: F) -> usize
    where
        F: FnMut(&crate::trace::SimulationStep) -> std::ops::ControlFlow<()>,
    {
        let interval = self.config.playback_interval;
        match self.playback.as_mut() {
            Some(playback) => autoplay(playback, interval, on_step).await,
            None => 0,
        }
    }
}
