use log::info;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::availability::{AttendanceRecord, Symbol};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("データベースエラー: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("不正な記号がデータベースに保存されています: {0}")]
    InvalidSymbol(String),
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS attendance (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    member TEXT NOT NULL,
    symbol TEXT NOT NULL,
    UNIQUE(date, member)
);
CREATE TABLE IF NOT EXISTS member_meta (
    member TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    UNIQUE(member, key)
);
";

/// Opens the store file and applies the schema.
pub fn open(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let conn = Connection::open(path.as_ref())?;
    bootstrap(&conn)?;
    info!("opened store at {}", path.as_ref().display());
    Ok(conn)
}

/// In-memory store, used by tests.
pub fn open_in_memory() -> StoreResult<Connection> {
    let conn = Connection::open_in_memory()?;
    bootstrap(&conn)?;
    Ok(conn)
}

fn bootstrap(conn: &Connection) -> StoreResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Replaces the whole store contents with a freshly imported payload.
///
/// Runs in one transaction: readers see either the previous snapshot or
/// the new one, never a partially replaced store. The UNIQUE(date, member)
/// constraint plus `INSERT OR IGNORE` keeps the first occurrence of a pair.
pub fn replace_all(
    conn: &mut Connection,
    records: &[AttendanceRecord],
    metadata: &HashMap<String, HashMap<String, String>>,
) -> StoreResult<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM attendance", [])?;
    tx.execute("DELETE FROM member_meta", [])?;

    {
        let mut insert = tx.prepare(
            "INSERT OR IGNORE INTO attendance (date, member, symbol) VALUES (?1, ?2, ?3)",
        )?;
        for record in records {
            insert.execute(params![record.date, record.member, record.symbol.as_str()])?;
        }

        let mut insert_meta = tx.prepare(
            "INSERT OR REPLACE INTO member_meta (member, key, value) VALUES (?1, ?2, ?3)",
        )?;
        for (member, entries) in metadata {
            for (key, value) in entries {
                insert_meta.execute(params![member, key, value])?;
            }
        }
    }

    tx.commit()?;
    info!(
        "replaced store contents: {} records, {} members with metadata",
        records.len(),
        metadata.len()
    );
    Ok(())
}

/// Loads every attendance record in insertion order.
pub fn load_records(conn: &Connection) -> StoreResult<Vec<AttendanceRecord>> {
    let mut stmt =
        conn.prepare("SELECT date, member, symbol FROM attendance ORDER BY id ASC")?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let date: String = row.get(0)?;
        let member: String = row.get(1)?;
        let symbol_text: String = row.get(2)?;
        // Reject invalid persisted state instead of masking it.
        let symbol = Symbol::parse(&symbol_text)
            .ok_or_else(|| StoreError::InvalidSymbol(symbol_text.clone()))?;
        records.push(AttendanceRecord {
            date,
            member,
            symbol,
        });
    }
    Ok(records)
}

/// Loads all per-member metadata as member -> key -> value.
pub fn load_metadata(conn: &Connection) -> StoreResult<HashMap<String, HashMap<String, String>>> {
    let mut stmt = conn.prepare("SELECT member, key, value FROM member_meta")?;
    let mut rows = stmt.query([])?;
    let mut metadata: HashMap<String, HashMap<String, String>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let member: String = row.get(0)?;
        let key: String = row.get(1)?;
        let value: String = row.get(2)?;
        metadata.entry(member).or_default().insert(key, value);
    }
    Ok(metadata)
}
