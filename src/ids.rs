// Task id generation

use std::cell::Cell;
use uuid::Uuid;

pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// Time-ordered UUIDv7 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    counter: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Cell::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids: HashSet<String> = (0..100).map(|_| UuidGenerator.next_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_uuid_id_format() {
        let id = UuidGenerator.next_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new("task");
        assert_eq!(ids.next_id(), "task-1");
        assert_eq!(ids.next_id(), "task-2");
    }
}
