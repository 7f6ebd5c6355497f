// Task store: canonical task collection with write-through persistence

use crate::clock::{Clock, SystemClock};
use crate::collection;
use crate::filter::TaskQuery;
use crate::ids::{IdGenerator, UuidGenerator};
use crate::models::{Task, TaskDraft, TaskPatch};
use crate::record::Record;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use tracing::{debug, info, warn};

/// Owns the task collection and mirrors every mutation to the backing store
///
/// The collection is read once in `open`. Each mutation builds the next
/// collection, writes it whole, and only then replaces the in-memory copy,
/// so a failed write leaves both sides as they were.
///
/// If loading dropped anything, the stored value is copied to the backup key
/// before the first write replaces it.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    tasks: Vec<Task>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    pending_backup: Option<String>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load tasks from `storage` using the wall clock and UUIDv7 ids
    pub fn open(storage: S) -> Result<Self> {
        Self::with_capabilities(storage, Box::new(SystemClock), Box::new(UuidGenerator))
    }

    pub fn with_capabilities(storage: S, clock: Box<dyn Clock>, ids: Box<dyn IdGenerator>) -> Result<Self> {
        let (tasks, pending_backup) = match collection::load::<Task, S>(&storage)? {
            Some(loaded) if loaded.lossy => (loaded.records, Some(loaded.raw)),
            Some(loaded) => (loaded.records, None),
            None => (Vec::new(), None),
        };
        info!(count = tasks.len(), lossy = pending_backup.is_some(), "Opened task store");

        Ok(Self {
            storage,
            tasks,
            clock,
            ids,
            pending_backup,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Stored collection in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Stamp a draft with a fresh id and created_at = updated_at = now
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task> {
        let task = self.stamp(draft);

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;

        debug!(id = %task.id, "Created task");
        Ok(task)
    }

    /// Stamp each draft independently and persist once
    pub fn create_bulk(&mut self, drafts: Vec<TaskDraft>) -> Result<Vec<Task>> {
        let created: Vec<Task> = drafts.into_iter().map(|d| self.stamp(d)).collect();

        let mut next = self.tasks.clone();
        next.extend(created.iter().cloned());
        self.commit(next)?;

        info!(count = created.len(), "Created tasks in bulk");
        Ok(created)
    }

    /// Merge `patch` into the task and refresh updated_at
    ///
    /// Returns `Ok(None)` and leaves the collection unchanged if `id` is unknown.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Option<Task>> {
        let now = self.clock.now();
        let mut next = self.tasks.clone();

        let updated = match next.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                patch.apply_to(task);
                task.updated_at = refreshed(task.updated_at, now);
                Some(task.clone())
            }
            None => {
                debug!(id, "Update for unknown id ignored");
                None
            }
        };

        self.commit(next)?;
        Ok(updated)
    }

    /// Move the task's status one step along the cycle
    pub fn advance_status(&mut self, id: &str) -> Result<Option<Task>> {
        let Some(current) = self.get(id).map(|t| t.status) else {
            debug!(id, "Advance for unknown id ignored");
            return Ok(None);
        };
        self.update(id, TaskPatch::new().status(current.next()))
    }

    /// Remove the task; returns whether anything was removed
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let mut next = self.tasks.clone();
        next.retain(|t| t.id != id);
        let removed = next.len() != self.tasks.len();

        self.commit(next)?;

        if removed {
            debug!(id, "Deleted task");
        } else {
            debug!(id, "Delete for unknown id ignored");
        }
        Ok(removed)
    }

    /// Filtered, sorted view of the collection; never mutates it
    pub fn query(&self, query: &TaskQuery) -> Vec<&Task> {
        query.apply(&self.tasks)
    }

    fn stamp(&self, draft: TaskDraft) -> Task {
        Task::from_draft(draft, self.ids.next_id(), self.clock.now())
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        if let Some(raw) = &self.pending_backup {
            let key = collection::backup_key(Task::storage_key());
            self.storage
                .set(&key, raw)
                .with_context(|| format!("Failed to back up unreadable tasks to {}", key))?;
            warn!(key = %key, "Backed up unreadable tasks before overwriting");
        }

        collection::save(&mut self.storage, &next)?;
        self.pending_backup = None;
        self.tasks = next;
        Ok(())
    }
}

// updated_at never moves backwards, even if the clock does
fn refreshed(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    previous.max(now)
}
