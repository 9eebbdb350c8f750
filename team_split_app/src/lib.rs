pub mod config;
pub mod logging;
pub mod state;
pub mod storage;
pub mod report;
pub mod session;

pub use config::Config;
pub use session::{GenerateOutcome, TeamSplitSession};
pub use state::PersistedState;
pub use storage::{FileStateStore, MemoryStateStore, StateStore, StorageError};
