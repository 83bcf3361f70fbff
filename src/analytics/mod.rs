// src/analytics/mod.rs
pub mod bs_analytic;
pub mod lognormal;
