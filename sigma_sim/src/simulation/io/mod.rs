// sigma_sim/src/simulation/io/mod.rs

pub mod log_format;
pub mod output;
