//! jobscout: rule-based job listing scoring and hiring-post detection, with an
//! optional external judge and a thin HTTP surface.

pub mod config;
pub mod errors;
pub mod filters;
pub mod jobs;
pub mod judge;
pub mod models;
pub mod routes;
pub mod scoring;
pub mod state;
