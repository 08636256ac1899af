//! CLI module - argument parsing and conversion into a run configuration

mod args;

pub use args::*;
