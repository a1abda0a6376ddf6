// src/core/state/mod.rs

//! Defines the central `ServerState` struct and the counter store it owns.

mod core;
mod stats;

pub use core::ServerState;
pub use stats::{Counter, StatField, StatsState};
