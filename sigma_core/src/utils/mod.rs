// sigma_core/src/utils/mod.rs

pub mod angles;
