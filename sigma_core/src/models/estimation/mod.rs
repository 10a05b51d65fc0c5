// sigma_core/src/models/estimation/mod.rs

//! Models as seen by the estimator: how the state evolves and how each
//! sensor observes it.

pub mod dynamics;
pub mod measurement;
