// sigma_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the sigma_sim crate.
pub mod prelude;

// This module contains all the runner-specific logic.
pub mod cli;
pub mod simulation;
