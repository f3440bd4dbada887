use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// A keyed store of small blobs, addressed by bucket index. This is the
/// "simple embedded relational store" spec.md §1 leaves as an external
/// collaborator — concretely backed by SQLite here, matching the original
/// implementation's single `hashtable (id INTEGER PRIMARY KEY, data BLOB)`
/// table.
pub trait Persister {
    fn put(&mut self, key: u32, value: &[u8]) -> Result<()>;
    fn iterate(&self) -> Result<Vec<(u32, Vec<u8>)>>;
    fn begin_txn(&mut self) -> Result<()>;
    fn commit_txn(&mut self) -> Result<()>;

    /// Records which 64-bit mixing hash produced this persister's
    /// fingerprints (spec.md §9's "schema the source lacks").
    fn put_metadata(&mut self, hash_kind: u32) -> Result<()>;
    fn read_metadata(&self) -> Result<Option<u32>>;
}

#[derive(Debug)]
pub struct SqlitePersister {
    conn: Connection,
}

impl SqlitePersister {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS hashtable (id INTEGER PRIMARY KEY, data BLOB NOT NULL);
             CREATE TABLE IF NOT EXISTS meta (id INTEGER PRIMARY KEY CHECK (id = 0), hash_kind INTEGER NOT NULL);",
        )?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS hashtable (id INTEGER PRIMARY KEY, data BLOB NOT NULL);
             CREATE TABLE IF NOT EXISTS meta (id INTEGER PRIMARY KEY CHECK (id = 0), hash_kind INTEGER NOT NULL);",
        )?;
        Ok(Self { conn })
    }
}

impl Persister for SqlitePersister {
    fn put(&mut self, key: u32, value: &[u8]) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached("INSERT OR REPLACE INTO hashtable (id, data) VALUES (?1, ?2)")?;
        stmt.execute(params![key, value])?;
        Ok(())
    }

    fn iterate(&self) -> Result<Vec<(u32, Vec<u8>)>> {
        let mut stmt = self.conn.prepare("SELECT id, data FROM hashtable")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, Vec<u8>>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn begin_txn(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(())
    }

    fn commit_txn(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT TRANSACTION")?;
        Ok(())
    }

    fn put_metadata(&mut self, hash_kind: u32) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (id, hash_kind) VALUES (0, ?1)",
            params![hash_kind],
        )?;
        Ok(())
    }

    fn read_metadata(&self) -> Result<Option<u32>> {
        self.conn
            .query_row("SELECT hash_kind FROM meta WHERE id = 0", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }
}
