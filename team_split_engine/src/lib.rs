pub mod import;
pub mod random;
pub mod shuffle;
pub mod allocation;
pub mod generator;

pub use allocation::*;
pub use import::*;
pub use generator::TeamGenerator;
pub use random::{RandomSource, ReplayRandom};
pub use shuffle::fisher_yates_shuffle;
