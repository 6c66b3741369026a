//! Platform abstraction layer
//!
//! The browser host drives the simulator from `requestAnimationFrame` and
//! `setTimeout`. Native hosts use [`crate::Simulator`] directly (see the
//! `field-sim` binary).

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{FieldSimulator, init_logging};
