//! Report module - run summaries, JSON run reports and inspection tables

pub mod inspection;
pub mod run_report;
pub mod summary;

pub use inspection::*;
pub use run_report::*;
pub use summary::*;
