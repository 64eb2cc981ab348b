//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the material-effects simulators MUST go through
//! this module.
//!
//! The engine is a shared collaborator: the orchestrator and every simulator
//! it builds hold a [`SharedRng`] handle to the same engine, so one seed
//! fixes the full random stream of a job.

mod xorshift;

use std::cell::RefCell;
use std::rc::Rc;

pub use xorshift::RngManager;

/// Handle to an engine shared by several simulators of one processing unit
pub type SharedRng = Rc<RefCell<RngManager>>;

/// Create a shared engine from a seed
pub fn shared(seed: u64) -> SharedRng {
    Rc::new(RefCell::new(RngManager::new(seed)))
}
