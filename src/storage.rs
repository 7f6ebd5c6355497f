// Key-value backing stores

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Get/set a serialized blob by key
///
/// `set` always overwrites the whole value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-memory store, lost on drop
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open or create a file store rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        info!(path = ?base_path, "Opened file storage");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    /// Sidecar lock file; the data file itself is replaced on every write
    fn lock(&self, key: &str) -> Result<File> {
        let path = self.base_path.join(format!("{}.lock", key));
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {:?}", path))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let lock = self.lock(key)?;
        lock.lock_shared().context("Failed to acquire file lock")?;

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read key file {:?}", path))?;
        Ok(Some(content))
    }

    /// Write `<key>.json.tmp`, sync it, then rename it over `<key>.json`
    ///
    /// A failed write leaves the previous value in place.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp_path = path.with_extension("json.tmp");

        let lock = self.lock(key)?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut file = File::create(&tmp_path).with_context(|| format!("Failed to create {:?}", tmp_path))?;
        file.write_all(value.as_bytes())
            .and_then(|_| file.sync_all())
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        drop(file);

        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace key file {:?}", path))?;

        debug!(key, bytes = value.len(), "Wrote key file");
        Ok(())
    }
}

/// SQLite-backed store: a single `kv` table
pub struct SqliteStorage {
    db: Connection,
}

impl SqliteStorage {
    /// Open or create `todostore.db` inside `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref();
        fs::create_dir_all(base_path).context("Failed to create store directory")?;

        let db_path = base_path.join("todostore.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;
        info!(path = ?db_path, "Opened SQLite storage");

        let store = Self { db };
        store.create_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let store = Self { db };
        store.create_schema()?;
        Ok(store)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, String>(0))
            .optional()
            .context("Failed to read key from database")?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, chrono::Utc::now().timestamp_millis()],
            )
            .context("Failed to write key to database")?;

        debug!(key, bytes = value.len(), "Wrote key to database");
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}
