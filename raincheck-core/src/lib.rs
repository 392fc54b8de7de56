mod config;
mod constants;
mod thresholds;
mod track;

pub use config::*;
pub use constants::*;
pub use thresholds::*;
pub use track::*;
