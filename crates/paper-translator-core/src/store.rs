//! SQLite-backed history of translation sessions.
//!
//! One row per session in a single `translations` table. The store keeps no
//! connection around: every operation opens its own and closes it on return,
//! so several processes can share the file under SQLite's own locking.
//!
//! Records leaving the store carry `pdf_data` as base64 text; use
//! [`TranslationRecord::decode_pdf`] to get the raw bytes back.
//!
//! Timestamps are local wall-clock time. The schema's `CURRENT_TIMESTAMP`
//! default is UTC and has no fractional part; such values are converted to
//! local time when read, and listings are ordered after that conversion.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{Local, NaiveDateTime, TimeZone};
use rusqlite::{Connection, OptionalExtension, ToSql, params};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS translations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        original_text TEXT,
        translated_text TEXT,
        pdf_data BLOB,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );";

const SELECT_COLUMNS: &str =
    "SELECT id, title, original_text, translated_text, pdf_data, created_at, updated_at FROM translations";

/// Fixed-width so that text order matches time order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Store-assigned identifier of a translation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A persisted translation session, as returned by `list_all` and `get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRecord {
    pub id: RecordId,
    pub title: String,
    pub original_text: String,
    pub translated_text: String,
    /// Base64 of the stored PDF, if one was saved
    pub pdf_data: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TranslationRecord {
    /// Decode `pdf_data` back into raw PDF bytes.
    pub fn decode_pdf(&self) -> Result<Option<Vec<u8>>> {
        self.pdf_data
            .as_deref()
            .map(|data| BASE64_STANDARD.decode(data))
            .transpose()
            .map_err(Error::from)
    }

    pub const fn has_pdf(&self) -> bool {
        self.pdf_data.is_some()
    }
}

/// Fields to change in [`TranslationStore::update`]. `None` leaves a column as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationUpdate {
    pub title: Option<String>,
    pub original_text: Option<String>,
    pub translated_text: Option<String>,
    /// Empty bytes clear the stored PDF
    pub pdf_bytes: Option<Vec<u8>>,
}

impl TranslationUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.original_text.is_none()
            && self.translated_text.is_none()
            && self.pdf_bytes.is_none()
    }
}

/// Row as read from SQLite, before timestamps are parsed.
struct RawRecord {
    id: i64,
    title: String,
    original_text: Option<String>,
    translated_text: Option<String>,
    pdf_data: Option<Vec<u8>>,
    created_at: String,
    updated_at: String,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            original_text: row.get(2)?,
            translated_text: row.get(3)?,
            pdf_data: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<TranslationRecord> {
        Ok(TranslationRecord {
            id: RecordId(self.id),
            title: self.title,
            original_text: self.original_text.unwrap_or_default(),
            translated_text: self.translated_text.unwrap_or_default(),
            pdf_data: self
                .pdf_data
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| BASE64_STANDARD.encode(bytes)),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn now_timestamp() -> String {
    Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts our own local format and SQLite's UTC `CURRENT_TIMESTAMP` (no
/// fraction), returning local time for both.
fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| Error::StoreTimestamp(format!("{value:?}: {e}")))?;

    if value.contains('.') {
        Ok(parsed)
    } else {
        Ok(Local.from_utc_datetime(&parsed).naive_local())
    }
}

/// Zero-length PDFs are stored as NULL.
fn non_empty(bytes: Option<&[u8]>) -> Option<&[u8]> {
    bytes.filter(|b| !b.is_empty())
}

/// Handle to the translation history database.
#[derive(Debug, Clone)]
pub struct TranslationStore {
    path: PathBuf,
}

impl TranslationStore {
    /// Open the store at `path`, creating the file and schema if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::StoreOpen {
                path: path.clone(),
                reason: format!("failed to create directory {}: {e}", parent.display()),
            })?;
        }

        let store = Self { path };
        store.initialize()?;
        info!("Opened translation store at {}", store.path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(|e| Error::StoreOpen {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Create the `translations` table if it does not exist. Safe to call repeatedly.
    pub fn initialize(&self) -> Result<()> {
        self.connect()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert a new record and return its id.
    pub fn save(
        &self,
        title: &str,
        original_text: &str,
        translated_text: &str,
        pdf_bytes: Option<&[u8]>,
    ) -> Result<RecordId> {
        let conn = self.connect()?;
        let now = now_timestamp();
        let pdf_bytes = non_empty(pdf_bytes);

        conn.execute(
            "INSERT INTO translations (title, original_text, translated_text, pdf_data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![title, original_text, translated_text, pdf_bytes, now],
        )?;

        let id = RecordId(conn.last_insert_rowid());
        debug!(
            "Saved translation {} ({:?}, pdf: {} bytes)",
            id,
            title,
            pdf_bytes.map_or(0, <[u8]>::len)
        );
        Ok(id)
    }

    /// All records, newest first.
    pub fn list_all(&self) -> Result<Vec<TranslationRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"
        ))?;

        let raw = stmt
            .query_map([], RawRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut records = raw
            .into_iter()
            .map(RawRecord::into_record)
            .collect::<Result<Vec<_>>>()?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        debug!("Listed {} translations", records.len());
        Ok(records)
    }

    pub fn get(&self, id: RecordId) -> Result<Option<TranslationRecord>> {
        let conn = self.connect()?;
        let raw = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.0],
                RawRecord::from_row,
            )
            .optional()?;

        raw.map(RawRecord::into_record).transpose()
    }

    /// Remove a record. Returns `false` if no row had this id.
    pub fn delete(&self, id: RecordId) -> Result<bool> {
        let conn = self.connect()?;
        let deleted = conn.execute("DELETE FROM translations WHERE id = ?1", params![id.0])?;
        debug!("Delete translation {}: {} row(s)", id, deleted);
        Ok(deleted > 0)
    }

    /// Apply a partial update. Returns `false` if nothing was supplied or no
    /// row matched.
    pub fn update(&self, id: RecordId, update: &TranslationUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(false);
        }

        let mut assignments = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(title) = &update.title {
            assignments.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(original_text) = &update.original_text {
            assignments.push("original_text = ?");
            values.push(Box::new(original_text.clone()));
        }
        if let Some(translated_text) = &update.translated_text {
            assignments.push("translated_text = ?");
            values.push(Box::new(translated_text.clone()));
        }
        if let Some(pdf_bytes) = &update.pdf_bytes {
            assignments.push("pdf_data = ?");
            values.push(Box::new(non_empty(Some(pdf_bytes)).map(<[u8]>::to_vec)));
        }
        assignments.push("updated_at = ?");
        values.push(Box::new(now_timestamp()));
        values.push(Box::new(id.0));

        let sql = format!(
            "UPDATE translations SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let params: Vec<&dyn ToSql> = values.iter().map(AsRef::as_ref).collect();

        let conn = self.connect()?;
        let updated = conn.execute(&sql, params.as_slice())?;
        debug!("Update translation {}: {} row(s)", id, updated);
        Ok(updated > 0)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, TranslationStore) {
        let dir = TempDir::new().unwrap();
        let store = TranslationStore::open(dir.path().join("translations.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, store) = temp_store();
        store.save("t", "o", "x", None).unwrap();

        store.initialize().unwrap();
        let reopened = TranslationStore::open(store.path()).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("t.db");
        let store = TranslationStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_get_round_trip() {
        let (_dir, store) = temp_store();
        let pdf = b"%PDF-1.5\n\x00\xffbinary".to_vec();

        let id = store
            .save("Attention Is All You Need", "Original body.", "# 번역\n\n본문이다.", Some(&pdf))
            .unwrap();
        let record = store.get(id).unwrap().unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.title, "Attention Is All You Need");
        assert_eq!(record.original_text, "Original body.");
        assert_eq!(record.translated_text, "# 번역\n\n본문이다.");
        assert_eq!(record.pdf_data.as_deref(), Some(BASE64_STANDARD.encode(&pdf).as_str()));
        assert_eq!(record.decode_pdf().unwrap(), Some(pdf));
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_save_without_pdf() {
        let (_dir, store) = temp_store();
        let id = store.save("t", "", "", None).unwrap();
        let record = store.get(id).unwrap().unwrap();

        assert_eq!(record.original_text, "");
        assert_eq!(record.translated_text, "");
        assert!(record.pdf_data.is_none());
        assert_eq!(record.decode_pdf().unwrap(), None);
    }

    #[test]
    fn test_empty_pdf_is_stored_as_null() {
        let (_dir, store) = temp_store();
        let id = store.save("t", "o", "x", Some(&[])).unwrap();

        let is_null: bool = store
            .connect()
            .unwrap()
            .query_row(
                "SELECT pdf_data IS NULL FROM translations WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .unwrap();
        assert!(is_null);
        assert!(store.get(id).unwrap().unwrap().pdf_data.is_none());
    }

    #[test]
    fn test_ids_increase() {
        let (_dir, store) = temp_store();
        let first = store.save("a", "", "", None).unwrap();
        let second = store.save("b", "", "", None).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_list_newest_first() {
        let (_dir, store) = temp_store();
        let first = store.save("first", "", "", None).unwrap();
        let second = store.save("second", "", "", None).unwrap();

        let ids: Vec<_> = store.list_all().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_list_orders_by_created_at() {
        let (_dir, store) = temp_store();
        let conn = store.connect().unwrap();
        conn.execute(
            "INSERT INTO translations (title, created_at, updated_at)
             VALUES ('newer', '2025-03-02 09:00:00.000000', '2025-03-02 09:00:00.000000')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO translations (title, created_at, updated_at)
             VALUES ('older', '2024-11-30 23:59:59.999999', '2024-11-30 23:59:59.999999')",
            [],
        )
        .unwrap();
        drop(conn);

        let records = store.list_all().unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
        assert!(records.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_column_default_timestamps_parse() {
        let (_dir, store) = temp_store();
        store
            .connect()
            .unwrap()
            .execute("INSERT INTO translations (title) VALUES ('legacy')", [])
            .unwrap();

        let records = store.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original_text, "");
        assert!(records[0].pdf_data.is_none());
    }

    #[test]
    fn test_column_default_timestamps_read_as_local_time() {
        let (_dir, store) = temp_store();
        store
            .connect()
            .unwrap()
            .execute("INSERT INTO translations (title) VALUES ('legacy')", [])
            .unwrap();

        let record = &store.list_all().unwrap()[0];
        let skew = Local::now().naive_local() - record.created_at;
        assert!(skew.num_seconds().abs() < 60, "created_at off by {skew}");
    }

    #[test]
    fn test_column_default_rows_order_with_saved_rows() {
        let (_dir, store) = temp_store();
        store
            .connect()
            .unwrap()
            .execute("INSERT INTO translations (title) VALUES ('legacy')", [])
            .unwrap();
        std::thread::sleep(Duration::from_millis(1100));
        let newer = store.save("newer", "o", "x", None).unwrap();

        let records = store.list_all().unwrap();
        assert_eq!(records[0].id, newer);
        assert_eq!(records[1].title, "legacy");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let own = parse_timestamp("2025-03-01 14:25:30.123456").unwrap();
        assert_eq!(own.to_string(), "2025-03-01 14:25:30.123456");

        let utc = NaiveDateTime::parse_from_str("2025-03-01 05:25:30", "%Y-%m-%d %H:%M:%S").unwrap();
        let default = parse_timestamp("2025-03-01 05:25:30").unwrap();
        assert_eq!(default, Local.from_utc_datetime(&utc).naive_local());

        assert!(matches!(parse_timestamp("yesterday"), Err(Error::StoreTimestamp(_))));
    }

    #[test]
    fn test_get_missing() {
        let (_dir, store) = temp_store();
        assert!(store.get(RecordId(42)).unwrap().is_none());
    }

    #[test]
    fn test_delete_twice() {
        let (_dir, store) = temp_store();
        let id = store.save("t", "o", "x", None).unwrap();

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing() {
        let (_dir, store) = temp_store();
        assert!(!store.delete(RecordId(7)).unwrap());
        assert!(!store.delete(RecordId(7)).unwrap());
    }

    #[test]
    fn test_partial_update_only_touches_title() {
        let (_dir, store) = temp_store();
        let pdf = b"%PDF-1.5 data".to_vec();
        let id = store.save("old", "orig", "trans", Some(&pdf)).unwrap();
        let before = store.get(id).unwrap().unwrap();

        std::thread::sleep(Duration::from_millis(5));
        assert!(store.update(id, &TranslationUpdate::title("X")).unwrap());
        let after = store.get(id).unwrap().unwrap();

        assert_eq!(after.title, "X");
        assert_eq!(after.original_text, before.original_text);
        assert_eq!(after.translated_text, before.translated_text);
        assert_eq!(after.pdf_data, before.pdf_data);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_update_all_fields() {
        let (_dir, store) = temp_store();
        let id = store.save("t", "o", "x", Some(b"old pdf")).unwrap();

        let update = TranslationUpdate {
            title: Some("t2".into()),
            original_text: Some("o2".into()),
            translated_text: Some("x2".into()),
            pdf_bytes: Some(b"new pdf".to_vec()),
        };
        assert!(store.update(id, &update).unwrap());

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.title, "t2");
        assert_eq!(record.original_text, "o2");
        assert_eq!(record.translated_text, "x2");
        assert_eq!(record.decode_pdf().unwrap(), Some(b"new pdf".to_vec()));
    }

    #[test]
    fn test_update_with_empty_pdf_clears_it() {
        let (_dir, store) = temp_store();
        let id = store.save("t", "o", "x", Some(b"pdf")).unwrap();

        let update = TranslationUpdate {
            pdf_bytes: Some(Vec::new()),
            ..TranslationUpdate::default()
        };
        assert!(store.update(id, &update).unwrap());
        assert!(store.get(id).unwrap().unwrap().pdf_data.is_none());
    }

    #[test]
    fn test_update_without_fields_is_noop() {
        let (_dir, store) = temp_store();
        let id = store.save("t", "o", "x", None).unwrap();
        let before = store.get(id).unwrap().unwrap();

        assert!(!store.update(id, &TranslationUpdate::default()).unwrap());
        assert_eq!(store.get(id).unwrap().unwrap(), before);
    }

    #[test]
    fn test_update_missing_row() {
        let (_dir, store) = temp_store();
        assert!(!store.update(RecordId(99), &TranslationUpdate::title("X")).unwrap());
    }

    #[test]
    fn test_decode_invalid_base64() {
        let record = TranslationRecord {
            id: RecordId(1),
            title: "t".into(),
            original_text: String::new(),
            translated_text: String::new(),
            pdf_data: Some("not base64!!".into()),
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        };
        assert!(matches!(record.decode_pdf(), Err(Error::Decode(_))));
    }

    #[test]
    fn test_record_id_parse() {
        assert_eq!(" 12 ".parse::<RecordId>().unwrap(), RecordId(12));
        assert!("abc".parse::<RecordId>().is_err());
        assert_eq!(RecordId(5).to_string(), "5");
    }
}
