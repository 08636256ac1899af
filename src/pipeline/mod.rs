//! Pipeline module - load, inspect, clean and split datasets

pub mod inspect;
pub mod loader;
pub mod missing;
pub mod runner;
pub mod split;
pub mod tabular;

pub use inspect::*;
pub use loader::*;
pub use missing::*;
pub use runner::*;
pub use split::*;
pub use tabular::*;
