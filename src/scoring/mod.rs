//! Score aggregation and display banding.
//!
//! This module turns raw per-sub-item scores into per-item averages and a
//! weighted final grade on the 0–5 scale, classifies scores into display
//! tiers, and describes the fixed-grid beam workshop rubric.

pub mod aggregate;
pub mod grid;
pub mod tier;
pub mod types;
pub mod utility;

pub use aggregate::compute_grade;
pub use tier::{Tier, TierScale};
pub use types::{GradeResult, ItemSummary, ScoreEntry};
