//! Management commands for seed archives.
//!
//! - [`DumpSeedCommand`] - snapshot tables into archives
//! - [`LoadSeedCommand`] - restore archives, or inspect their comments

mod dumpseed;
mod loadseed;

pub use dumpseed::{DumpSeedArgs, DumpSeedCommand, DumpSeedOptions};
pub use loadseed::{LoadSeedArgs, LoadSeedCommand, LoadSeedOptions, LoadSeedResult};
