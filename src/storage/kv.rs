use std::{collections::HashMap, time::SystemTime};

use rusqlite::{OptionalExtension, params};

use crate::{
    config::StorageConfig,
    ports::StoragePort,
    storage::{
        db::{self, SecondsSinceUnix, system_time_to_i64},
        error::StorageError,
        schema::{columns::*, tables::*},
    },
};

/// Local storage kept in a SQLite database
pub struct SqliteStorage {
    pub(crate) db: rusqlite::Connection,
}

impl SqliteStorage {
    /// when called, opens a data base connection
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        Ok(Self::from_existing_conn(db::open(config)?))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    fn write(&mut self, key: &str, value: &str, at: SystemTime) -> Result<(), StorageError> {
        let time_secs = system_time_to_i64(at).map_err(StorageError::Internal)?;
        let tx = self.db.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO {LOCAL_STORAGE} ({KEY}, {VALUE}) VALUES (?1, ?2)
                 ON CONFLICT({KEY}) DO UPDATE SET {VALUE} = excluded.{VALUE}"
            ),
            params![key, value],
        )?;
        // only the latest write time is kept
        tx.execute(&format!("DELETE FROM {UPDATES}"), [])?;
        tx.execute(
            &format!("INSERT INTO {UPDATES} ({UPDATED_AT}) VALUES (?1)"),
            params![time_secs],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Time of the most recent write, if anything was ever written.
    pub fn last_updated(&self) -> Result<Option<SecondsSinceUnix>, StorageError> {
        let updated_at: Option<SecondsSinceUnix> = self.db.query_row(
            &format!("SELECT MAX({UPDATED_AT}) FROM {UPDATES}"),
            [],
            |row| row.get(0),
        )?;
        Ok(updated_at)
    }
}

impl StoragePort for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .db
            .query_row(
                &format!("SELECT {VALUE} FROM {LOCAL_STORAGE} WHERE {KEY} = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write(key, value, SystemTime::now())
    }
}

/// Volatile storage. `read_only` makes every write fail.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    pub read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use rusqlite::Connection;
    use tempfile::tempdir;

    use super::*;
    use crate::storage::schema;

    fn setup_storage() -> anyhow::Result<SqliteStorage> {
        let conn = Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(SqliteStorage::from_existing_conn(conn))
    }

    #[test]
    fn get_missing_key_is_none() -> anyhow::Result<()> {
        let storage = setup_storage()?;

        assert_eq!(storage.get("TrashSongList")?, None);
        assert_eq!(storage.last_updated()?, None);
        Ok(())
    }

    #[test]
    fn set_overwrites_previous_value() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        storage.set("trashbin-enabled", "true")?;
        storage.set("trashbin-enabled", "false")?;

        assert_eq!(storage.get("trashbin-enabled")?, Some("false".to_string()));

        let rows: i64 = storage.db.query_row(
            &format!("SELECT COUNT(*) FROM {LOCAL_STORAGE}"),
            [],
            |row| row.get(0),
        )?;
        assert_eq!(rows, 1);
        Ok(())
    }

    #[test]
    fn writes_record_update_time() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        storage.write("a", "1", UNIX_EPOCH + Duration::from_secs(100))?;
        storage.write("b", "2", UNIX_EPOCH + Duration::from_secs(200))?;

        assert_eq!(storage.last_updated()?, Some(200));
        Ok(())
    }

    #[test]
    fn update_log_keeps_a_single_row() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        for secs in 1..=5 {
            storage.write("TrashSongList", "{}", UNIX_EPOCH + Duration::from_secs(secs))?;
        }

        let rows: i64 = storage.db.query_row(
            &format!("SELECT COUNT(*) FROM {UPDATES}"),
            [],
            |row| row.get(0),
        )?;
        assert_eq!(rows, 1);
        assert_eq!(storage.last_updated()?, Some(5));
        Ok(())
    }

    #[test]
    fn values_survive_reopen() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let config = StorageConfig {
            in_memory: false,
            path: Some(dir.path().join("trashbin.db")),
        };

        {
            let mut storage = SqliteStorage::new(&config)?;
            storage.set("TrashSongList", r#"{"spotify:track:1":true}"#)?;
        }

        let storage = SqliteStorage::new(&config)?;
        assert_eq!(
            storage.get("TrashSongList")?,
            Some(r#"{"spotify:track:1":true}"#.to_string())
        );
        Ok(())
    }

    #[test]
    fn read_only_memory_storage_rejects_writes() {
        let mut storage = MemoryStorage::new().with_value("k", "v");
        storage.read_only = true;

        assert!(matches!(storage.set("k", "w"), Err(StorageError::ReadOnly)));
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
    }
}
