//! Simulation view model
//!
//! Wraps a [`Scheduler`] for hosts: it republishes the state after every
//! frame, timer or reset, and hands the finished collaborator to each run as
//! its completion callback. Also carries a headless driver that runs a
//! program to the end on a virtual clock.

use std::rc::Rc;

use crate::settings::Settings;
use crate::sim::{
    Action, FrameOutcome, FrameRequest, Phase, RunError, Scheduler, SimState, StateOverrides,
};

type Finished = Rc<dyn Fn(&SimState)>;

pub struct Simulator {
    scheduler: Scheduler,
    /// Copy handed to renderers; only this type writes it
    published: SimState,
    on_finished: Option<Finished>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(StateOverrides::default())
    }
}

impl Simulator {
    pub fn new(overrides: StateOverrides) -> Self {
        let scheduler = Scheduler::new(overrides);
        let published = scheduler.state().clone();
        Self {
            scheduler,
            published,
            on_finished: None,
        }
    }

    /// Register the collaborator told about each naturally finished run
    pub fn set_on_finished(&mut self, callback: impl Fn(&SimState) + 'static) {
        self.on_finished = Some(Rc::new(callback));
    }

    /// Latest published snapshot
    pub fn state(&self) -> &SimState {
        &self.published
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn actions(&self) -> &[Action] {
        self.scheduler.actions()
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.scheduler.pending_frame()
    }

    pub fn next_timer_due(&self) -> Option<f64> {
        self.scheduler.next_timer_due()
    }

    /// Change the start template; takes effect at the next reset or run
    pub fn set_overrides(&mut self, overrides: StateOverrides) {
        self.scheduler.set_overrides(overrides);
    }

    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.publish();
    }

    /// Start running `source`. Returns the first frame request to serve.
    pub fn run(&mut self, source: &str) -> Result<FrameRequest, RunError> {
        let completion = self.on_finished.clone().map(|finished| {
            Box::new(move |state: &SimState| finished(state)) as crate::sim::Completion
        });
        let result = self.scheduler.run(source, completion);
        self.publish();
        result
    }

    pub fn frame(&mut self, request: FrameRequest, time_ms: f64) -> FrameOutcome {
        let outcome = self.scheduler.frame(request, time_ms);
        if outcome != FrameOutcome::Ignored {
            self.publish();
        }
        outcome
    }

    pub fn poll_timers(&mut self, now_ms: f64) -> bool {
        let fired = self.scheduler.poll_timers(now_ms);
        if fired {
            self.publish();
        }
        fired
    }

    fn publish(&mut self) {
        self.published.clone_from(self.scheduler.state());
    }

    /// Run `source` to the end on a virtual clock.
    ///
    /// Frames land every `settings.frame_interval_ms`, timers are polled
    /// before each frame. Returns the state the run finished with; any shot
    /// flash still armed is then allowed to clear in the published state.
    pub fn run_to_completion(
        &mut self,
        source: &str,
        settings: &Settings,
    ) -> Result<SimState, RunError> {
        self.run(source)?;

        let mut now = 0.0;
        let mut frames = 0;
        while let Some(request) = self.pending_frame() {
            if frames >= settings.max_frames {
                log::warn!("giving up after {frames} frames");
                self.reset();
                return Err(RunError::Stalled { frames });
            }
            now += settings.frame_interval_ms;
            frames += 1;
            self.poll_timers(now);
            self.frame(request, now);
        }
        log::debug!("headless run took {frames} frames ({now:.0} ms)");

        let final_state = self.published.clone();
        while let Some(due) = self.next_timer_due() {
            self.poll_timers(due);
        }
        Ok(final_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use std::cell::Cell;

    #[test]
    fn test_published_state_tracks_frames() {
        let mut sim = Simulator::default();
        let request = sim.run("motor.setPower(1);").unwrap();
        assert!(sim.state().is_running);
        sim.frame(request, 5.0);
        assert_eq!(sim.state().left_power, 1.0);
    }

    #[test]
    fn test_finished_callback_per_run() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let mut sim = Simulator::default();
        sim.set_on_finished(move |_| counter.set(counter.get() + 1));

        let settings = Settings::default();
        sim.run_to_completion("sleep(20);", &settings).unwrap();
        sim.run_to_completion("shoot();", &settings).unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_finished_state_parked_for_later_delivery() {
        let parked: Rc<std::cell::RefCell<Option<SimState>>> = Rc::default();
        let slot = Rc::clone(&parked);
        let mut sim = Simulator::default();
        sim.set_on_finished(move |state| *slot.borrow_mut() = Some(state.clone()));

        let mut request = sim.run("motor.setPower(0.5);\nsleep(40);").unwrap();
        let mut now = 0.0;
        loop {
            now += 16.0;
            let outcome = sim.frame(request, now);
            if outcome == FrameOutcome::Finished {
                break;
            }
            assert!(parked.borrow().is_none());
            request = sim.pending_frame().unwrap();
        }

        // Taken after the frame returns, it is exactly the published state
        let delivered = parked.borrow_mut().take().unwrap();
        assert_eq!(&delivered, sim.state());
        assert!(!delivered.is_running);
        assert_eq!(delivered.left_power, 0.0);
    }

    #[test]
    fn test_reset_mid_run_skips_callback() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let mut sim = Simulator::default();
        sim.set_on_finished(move |_| counter.set(counter.get() + 1));

        let request = sim.run("motor.setPower(1);\nsleep(1000);").unwrap();
        sim.frame(request, 0.0);
        sim.reset();
        assert_eq!(sim.pending_frame(), None);
        assert_eq!(sim.state(), &SimState::default());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_shot_flash_settles_after_headless_run() {
        let mut sim = Simulator::default();
        let final_state = sim.run_to_completion("shoot();", &Settings::default()).unwrap();
        assert!(final_state.is_shooting);
        assert!(!sim.state().is_shooting);
    }

    #[test]
    fn test_stalled_run_gives_up() {
        let settings = Settings {
            max_frames: 10,
            ..Settings::default()
        };
        let mut sim = Simulator::default();
        let err = sim.run_to_completion("sleep(100000);", &settings).unwrap_err();
        assert_eq!(err, RunError::Stalled { frames: 10 });
        assert_eq!(sim.pending_frame(), None);
    }

    #[test]
    fn test_overrides_apply_on_reset() {
        let mut sim = Simulator::default();
        sim.set_overrides(StateOverrides {
            x: Some(60.0),
            ..Default::default()
        });
        assert_eq!(sim.state().x, START_X);
        sim.reset();
        assert_eq!(sim.state().x, 60.0);
    }
}
