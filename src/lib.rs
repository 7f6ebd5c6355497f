// todostore - Local task manager persisted in a key-value store

pub mod categories;
pub mod clock;
pub mod collection;
pub mod config;
pub mod filter;
pub mod ids;
pub mod models;
pub mod record;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use categories::CategoryProvider;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Backend, Config};
pub use filter::{SortKey, TaskQuery};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use models::{Category, DueState, Priority, Status, Task, TaskDraft, TaskPatch, default_categories};
pub use record::Record;
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, SqliteStorage};
pub use store::TaskStore;
