//! Pricewise: dataset preparation library
//!
//! Loads a tabular dataset from a zip archive, handles missing values with
//! interchangeable drop/fill strategies and produces a reproducible
//! train/test split for a target column.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;
