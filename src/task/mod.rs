#![forbid(unsafe_code)]

pub mod manager;
pub mod model;
pub mod storage;

pub use manager::{AddOutcome, EditOutcome, EmptyEditPolicy, ListOptions, Snapshot, TaskListManager};
pub use model::{FilterMode, Priority, Task, TaskStats};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
