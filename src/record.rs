// Record trait for collections persisted under a single key

use crate::models::{Category, Task};
use serde::{Serialize, de::DeserializeOwned};

/// Core trait for any type stored as a whole-collection JSON array
pub trait Record: Serialize + DeserializeOwned + Clone + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Backing-store key holding the collection (e.g. "todos")
    fn storage_key() -> &'static str
    where
        Self: Sized;
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn storage_key() -> &'static str {
        "todos"
    }
}

impl Record for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn storage_key() -> &'static str {
        "categories"
    }
}
