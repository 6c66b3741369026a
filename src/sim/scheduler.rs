//! Frame-driven run loop
//!
//! Drains the parsed action list one action per animation frame while
//! physics integrates every frame. The host owns the clock: it asks for the
//! pending [`FrameRequest`], waits for its next frame, and hands the request
//! back with that frame's timestamp. `reset` invalidates any outstanding
//! request, so at most one frame chain is live at a time.

use thiserror::Error;

use super::action::{Action, first_error};
use super::parser::parse;
use super::physics::step;
use super::state::{SimState, StateOverrides};
use crate::consts::*;

/// Called once with the final state when a run finishes on its own
pub type Completion = Box<dyn FnOnce(&SimState)>;

/// Why a run could not start or finish
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    /// The source produced an error sentinel; nothing was scheduled
    #[error("{message}")]
    Parse { message: String },
    /// A headless host gave up after driving this many frames
    #[error("run still going after {frames} frames")]
    Stalled { frames: u32 },
}

/// Token for the one frame callback a run is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest {
    generation: u64,
    serial: u64,
}

/// What a frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Request was stale (cancelled by a reset or already used)
    Ignored,
    /// Frame processed; another one is requested
    Continue,
    /// The run finished this frame and the completion callback fired
    Finished,
    /// Frame processed and nothing further is requested
    Stopped,
}

/// Where a run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
    Aborted,
}

pub struct Scheduler {
    overrides: StateOverrides,
    state: SimState,
    phase: Phase,
    actions: Vec<Action>,
    cursor: usize,
    /// Frame time before which no action is dequeued
    sleep_until: f64,
    last_time: Option<f64>,
    /// Bumped on every reset; requests from older generations are stale
    generation: u64,
    serial: u64,
    pending: Option<FrameRequest>,
    /// Due times of armed shot-flash clears, in arming order
    shot_timers: Vec<f64>,
    on_complete: Option<Completion>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(StateOverrides::default())
    }
}

impl Scheduler {
    pub fn new(overrides: StateOverrides) -> Self {
        Self {
            state: SimState::with_overrides(&overrides),
            overrides,
            phase: Phase::Idle,
            actions: Vec::new(),
            cursor: 0,
            sleep_until: 0.0,
            last_time: None,
            generation: 0,
            serial: 0,
            pending: None,
            shot_timers: Vec::new(),
            on_complete: None,
        }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Earliest armed shot-flash clear
    pub fn next_timer_due(&self) -> Option<f64> {
        self.shot_timers.iter().copied().reduce(f64::min)
    }

    /// Replace the template overrides used by future resets
    pub fn set_overrides(&mut self, overrides: StateOverrides) {
        self.overrides = overrides;
    }

    /// Cancel everything in flight and return to the baseline state
    pub fn reset(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("cancelled pending frame (generation {})", self.generation);
        }
        self.generation += 1;
        self.shot_timers.clear();
        self.on_complete = None;
        self.state = SimState::with_overrides(&self.overrides);
        self.phase = Phase::Idle;
        self.actions.clear();
        self.cursor = 0;
        self.sleep_until = 0.0;
        self.last_time = None;
    }

    /// Parse `source` and start a run.
    ///
    /// On a parse error the state carries the message, nothing is scheduled
    /// and the error is returned.
    pub fn run(
        &mut self,
        source: &str,
        on_complete: Option<Completion>,
    ) -> Result<FrameRequest, RunError> {
        self.run_actions(parse(source), on_complete)
    }

    /// Start a run over an already parsed action list
    pub fn run_actions(
        &mut self,
        actions: Vec<Action>,
        on_complete: Option<Completion>,
    ) -> Result<FrameRequest, RunError> {
        self.reset();

        if let Some(message) = first_error(&actions) {
            log::warn!("run aborted before start: {message}");
            self.state.error = Some(message.to_string());
            self.state.is_running = false;
            self.phase = Phase::Aborted;
            return Err(RunError::Parse {
                message: message.to_string(),
            });
        }

        log::info!("run started with {} actions", actions.len());
        self.actions = actions;
        self.state.is_running = true;
        self.phase = Phase::Running;
        self.on_complete = on_complete;
        Ok(self.request_frame())
    }

    fn request_frame(&mut self) -> FrameRequest {
        self.serial += 1;
        let request = FrameRequest {
            generation: self.generation,
            serial: self.serial,
        };
        self.pending = Some(request);
        request
    }

    /// Process one animation frame at host time `time_ms`
    pub fn frame(&mut self, request: FrameRequest, time_ms: f64) -> FrameOutcome {
        if self.pending != Some(request) {
            log::debug!("ignoring stale frame request {request:?}");
            return FrameOutcome::Ignored;
        }
        self.pending = None;

        let last = self.last_time.unwrap_or(time_ms);
        let elapsed = (time_ms - last).min(MAX_FRAME_MS);
        self.last_time = Some(time_ms);

        let mut finished = false;
        if time_ms < self.sleep_until {
            // Sleeping: keep moving, dequeue nothing
            step(&self.state, elapsed).apply(&mut self.state);
        } else {
            if let Some(action) = self.actions.get(self.cursor).cloned() {
                self.cursor += 1;
                self.apply(action, time_ms);
            } else if self.state.is_running {
                self.finish();
                finished = true;
            }

            if self.state.is_running {
                step(&self.state, elapsed).apply(&mut self.state);
            }
        }

        if self.state.is_running || time_ms < self.sleep_until {
            self.request_frame();
            FrameOutcome::Continue
        } else if finished {
            FrameOutcome::Finished
        } else {
            FrameOutcome::Stopped
        }
    }

    fn apply(&mut self, action: Action, time_ms: f64) {
        log::debug!("t={time_ms:.1} action #{}: {action:?}", self.cursor);
        let state = &mut self.state;
        match action {
            Action::Log { key, value } => state.logs.push(format!("{key}: {value}")),
            Action::Move { power } => {
                state.left_power = power;
                state.right_power = power;
            }
            Action::Intake { power } => state.intake_power = power,
            Action::Spindexer { pos } => state.spindexer_position = pos,
            Action::Shoot => {
                state.is_shooting = true;
                state.held_artifact = None;
                self.shot_timers.push(time_ms + SHOT_FLASH_MS);
            }
            Action::Sleep { duration_ms } => self.sleep_until = time_ms + duration_ms as f64,
            Action::Var { name, value } => {
                state.variables.insert(name, value);
            }
            // Runs with errors never reach the loop
            Action::Error { .. } => {}
        }
    }

    fn finish(&mut self) {
        let state = &mut self.state;
        state.is_running = false;
        state.left_power = 0.0;
        state.right_power = 0.0;
        state.intake_power = 0.0;
        self.phase = Phase::Finished;
        log::info!(
            "run finished at ({:.1}, {:.1}) heading {:.1}",
            state.x,
            state.y,
            state.rotation
        );
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(&self.state);
        }
    }

    /// Fire every shot-flash clear due at or before `now_ms`.
    /// Returns true if any fired.
    pub fn poll_timers(&mut self, now_ms: f64) -> bool {
        let before = self.shot_timers.len();
        self.shot_timers.retain(|&due| due > now_ms);
        let fired = self.shot_timers.len() < before;
        if fired {
            self.state.is_shooting = false;
        }
        fired
    }
}
