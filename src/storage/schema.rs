use rusqlite::Connection;

pub mod tables {
    pub const LOCAL_STORAGE: &str = "local_storage";
    pub const UPDATES: &str = "updates";

    pub const ALL_TABLES: &[&str] = &[LOCAL_STORAGE, UPDATES];
}

pub mod columns {
    pub const KEY: &str = "key";
    pub const VALUE: &str = "value";
    pub const UPDATED_AT: &str = "updated_at";
}

pub use columns::*;
pub use tables::*;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT NOT NULL PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS updates (
    updated_at INTEGER NOT NULL
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
