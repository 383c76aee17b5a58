//! Baseline forecaster for pairwise tournament matchups.
//!
//! Historical compact results are folded into per-team season strength
//! (win percentage and scoring margin); the strength gap between two teams
//! goes through a logistic to give P(lower id team wins).

pub mod config;
pub mod data;
pub mod pipeline;
pub mod strength;
pub mod submission;
