//! Gradebook persistence and consolidation.
//!
//! [`GradebookStore`] appends grades to a comma-delimited file through a
//! read/modify/write cycle, migrating legacy headers as it goes.
//! [`merge`] joins two gradebooks on the student column.

pub mod merge;
pub mod schema;
pub mod store;
pub mod table;

pub use merge::{MergeOptions, merge, merge_files};
pub use schema::GradebookSchema;
pub use store::{GradebookRow, GradebookStore};
pub use table::Table;
