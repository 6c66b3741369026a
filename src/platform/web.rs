//! Browser host
//!
//! Exposes `FieldSimulator` to JavaScript. Frames come from
//! `requestAnimationFrame`, shot-flash clears from `setTimeout`, both keyed to
//! the same `performance.now()` clock the frame timestamps use.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::sim::{FrameOutcome, FrameRequest, SimState, StateOverrides};
use crate::simulator::Simulator;

/// Route `log` to the browser console and panics to `console.error`
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

struct Host {
    sim: Simulator,
    /// Outstanding requestAnimationFrame id
    frame_handle: Option<i32>,
    /// Outstanding setTimeout id and the due time it serves
    timer: Option<(i32, f64)>,
    /// JS callback and the final state the simulator left for it
    finished: Option<(js_sys::Function, Outbox)>,
}

/// Final state parked by the simulator until the host borrow is released
type Outbox = Rc<RefCell<Option<SimState>>>;

#[wasm_bindgen]
pub struct FieldSimulator {
    host: Rc<RefCell<Host>>,
}

#[wasm_bindgen]
impl FieldSimulator {
    /// `initial_state` is a partial state in JSON; `on_finished` receives the
    /// final state JSON whenever a run completes on its own.
    #[wasm_bindgen(constructor)]
    pub fn new(
        initial_state: Option<String>,
        on_finished: Option<js_sys::Function>,
    ) -> Result<FieldSimulator, JsError> {
        let overrides: StateOverrides = match initial_state {
            Some(json) => serde_json::from_str(&json)?,
            None => StateOverrides::default(),
        };
        let mut sim = Simulator::new(overrides);
        let finished = on_finished.map(|callback| {
            let outbox: Outbox = Rc::default();
            let parked = Rc::clone(&outbox);
            sim.set_on_finished(move |state| *parked.borrow_mut() = Some(state.clone()));
            (callback, outbox)
        });
        let host = Host {
            sim,
            frame_handle: None,
            timer: None,
            finished,
        };
        Ok(Self {
            host: Rc::new(RefCell::new(host)),
        })
    }

    /// Start running `code`. Parse errors are thrown and also left in the
    /// state's `error` field.
    pub fn run(&self, code: &str) -> Result<(), JsError> {
        cancel_callbacks(&self.host);
        let request = self.host.borrow_mut().sim.run(code)?;
        schedule_frame(&self.host, request);
        Ok(())
    }

    pub fn reset(&self) {
        cancel_callbacks(&self.host);
        self.host.borrow_mut().sim.reset();
    }

    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.host.borrow().sim.state())?)
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.host.borrow().sim.state().is_running
    }
}

fn cancel_callbacks(host: &Rc<RefCell<Host>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let mut h = host.borrow_mut();
    if let Some(id) = h.frame_handle.take() {
        let _ = window.cancel_animation_frame(id);
    }
    if let Some((id, _)) = h.timer.take() {
        window.clear_timeout_with_handle(id);
    }
}

fn schedule_frame(host: &Rc<RefCell<Host>>, request: FrameRequest) {
    let Some(window) = web_sys::window() else {
        log::error!("no window to schedule frames on");
        return;
    };
    let frame_host = Rc::clone(host);
    let callback = Closure::once_into_js(move |time: f64| on_frame(frame_host, request, time));
    match window.request_animation_frame(callback.unchecked_ref()) {
        Ok(id) => host.borrow_mut().frame_handle = Some(id),
        Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
    }
}

fn on_frame(host: Rc<RefCell<Host>>, request: FrameRequest, time: f64) {
    let (outcome, next, finished) = {
        let mut h = host.borrow_mut();
        h.frame_handle = None;
        let outcome = h.sim.frame(request, time);
        let finished = h.finished.as_ref().and_then(|(callback, outbox)| {
            let state = outbox.borrow_mut().take()?;
            Some((callback.clone(), state))
        });
        (outcome, h.sim.pending_frame(), finished)
    };
    if outcome == FrameOutcome::Ignored {
        return;
    }

    arm_timer(&host, time);
    if let Some(request) = next {
        schedule_frame(&host, request);
    }
    // Host borrow is released; the callback may call back into us
    if let Some((callback, state)) = finished {
        notify(&callback, &state);
    }
}

fn notify(callback: &js_sys::Function, state: &SimState) {
    match serde_json::to_string(state) {
        Ok(json) => {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("finished callback threw: {e:?}");
            }
        }
        Err(e) => log::error!("failed to serialize final state: {e}"),
    }
}

/// Make sure a timeout is armed for the earliest pending shot-flash clear
fn arm_timer(host: &Rc<RefCell<Host>>, now: f64) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let mut h = host.borrow_mut();
    let Some(due) = h.sim.next_timer_due() else {
        return;
    };
    if let Some((id, armed)) = h.timer {
        if armed <= due {
            return;
        }
        window.clear_timeout_with_handle(id);
        h.timer = None;
    }

    let timer_host = Rc::clone(host);
    let callback = Closure::once_into_js(move || on_timer(timer_host, due));
    let delay = (due - now).max(0.0).ceil() as i32;
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay,
    ) {
        Ok(id) => h.timer = Some((id, due)),
        Err(e) => log::error!("setTimeout failed: {e:?}"),
    }
}

fn on_timer(host: Rc<RefCell<Host>>, due: f64) {
    {
        let mut h = host.borrow_mut();
        h.timer = None;
        h.sim.poll_timers(due);
    }
    arm_timer(&host, due);
}
