#![forbid(unsafe_code)]

//! Headless force-directed layout used by the physical topology view.
//!
//! The simulation is tick driven: callers own the loop (a UI frame callback, or
//! [`ForceSimulation::run`] for batch use) and read node positions between ticks.

pub mod error;
pub mod graph;
pub mod rng;
pub mod simulation;

pub use error::{Error, Result};
pub use graph::{SimLink, SimNode};
pub use rng::XorShift64Star;
pub use simulation::{ForceOptions, ForceSimulation};
