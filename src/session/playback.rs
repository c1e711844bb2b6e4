//! Step-by-step playback over a finished trace.
//!
//! Playback only moves an index; the trace itself is never touched.

use crate::automaton::State;
use crate::trace::{SimulationStep, Trace};

/// Cursor into a trace with play/pause semantics.
#[derive(Debug, Clone)]
pub struct Playback {
    trace: Trace,
    index: usize,
    playing: bool,
}

impl Playback {
    /// Start paused at step 0.
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            index: 0,
            playing: false,
        }
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&SimulationStep> {
        self.trace.get(self.index)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// At the last step.
    pub fn is_complete(&self) -> bool {
        self.index + 1 >= self.trace.len()
    }

    /// At the last step and that step accepts.
    pub fn is_accepted(&self) -> bool {
        self.is_complete() && self.current().map(SimulationStep::state) == Some(State::Accept)
    }

    /// `(step number, total steps)`, 1-based for display.
    pub fn progress(&self) -> (usize, usize) {
        (self.index + 1, self.trace.len())
    }

    /// Advance one step. Returns `false` when already at the end.
    pub fn step_forward(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Pause and return to step 0.
    pub fn reset(&mut self) {
        self.pause();
        self.index = 0;
    }

    /// Start auto-advancing. Ignored once complete.
    pub fn play(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.playing = true;
        true
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// One timer tick: advance if playing, and stop playing at the end.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        let advanced = self.step_forward();
        if self.is_complete() {
            self.playing = false;
        }
        advanced
    }
}

/// Drive `playback` on a timer until it completes or `on_step` breaks.
///
/// Calls `on_step` after every advance with the new current step. Returning
/// [`ControlFlow::Break`] pauses playback at that step. Playback is also
/// paused when the returned future is dropped early, so a cancelled run
/// does not keep later [`Playback::tick`] calls advancing. Returns the
/// number of steps advanced.
///
/// [`ControlFlow::Break`]: std::ops::ControlFlow::Break
#[cfg(feature = "autoplay")]
pub async fn autoplay<F>(
    playback: &mut Playback,
    interval: std::time::Duration,
    mut on_step: F,
) -> usize
where
    F: FnMut(&SimulationStep) -> std::ops::ControlFlow<()>,
{
    let mut advanced = 0;
    if !playback.play() {
        return advanced;
    }
    let mut guard = PauseOnDrop(playback);
    tracing::debug!(?interval, from = guard.0.index(), "Autoplay started");

    while guard.0.is_playing() {
        tokio::time::sleep(interval).await;
        if !guard.0.tick() {
            break;
        }
        advanced += 1;
        if let Some(step) = guard.0.current() {
            if on_step(step).is_break() {
                break;
            }
        }
    }

    tracing::debug!(advanced, at = guard.0.index(), "Autoplay stopped");
    advanced
}

/// Pauses the borrowed playback when dropped.
#[cfg(feature = "autoplay")]
struct PauseOnDrop<'a>(&'a mut Playback);

#[cfg(feature = "autoplay")]
impl Drop for PauseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.pause();
    }
}
