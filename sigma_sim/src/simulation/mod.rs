// sigma_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod evaluation;
pub mod io;
pub mod runner;
pub mod scenario;
pub mod session;
