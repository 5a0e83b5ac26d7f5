pub mod config;
pub mod error;
pub mod gradebook;
pub mod report;
pub mod roster;
pub mod rubric;
pub mod scoring;
pub mod session;
