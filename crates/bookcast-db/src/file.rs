//! JSON file backing the booking list.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Persistence error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for persistence operations.
pub type DbResult<T> = Result<T, DbError>;

/// A booking as stored on disk.
///
/// Rows are deliberately loose (`party_size` is signed, `time` is a plain
/// string) so a hand-edited or stale file still parses; semantic validation
/// happens when rows are turned into domain bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRow {
    pub id: String,
    pub venue_name: String,
    pub party_size: i64,
    pub time: String,
    #[serde(default)]
    pub is_confirmed: bool,
}

/// Handle to the durable booking file.
#[derive(Debug, Clone)]
pub struct BookingFile {
    path: PathBuf,
}

impl BookingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all rows, failing on unreadable or malformed content.
    ///
    /// A missing file is not an error and yields an empty list.
    pub async fn try_load(&self) -> DbResult<Vec<BookingRow>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Booking file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(DbError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // Decode entries one by one so a single bad row cannot take the
        // rest of the file down with it.
        let entries: Vec<serde_json::Value> = serde_json::from_str(&data)?;
        let total = entries.len();
        let rows: Vec<BookingRow> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(path = %self.path.display(), index, error = %e, "Skipping unreadable booking row");
                    None
                }
            })
            .collect();

        info!(path = %self.path.display(), count = rows.len(), skipped = total - rows.len(), "Loaded bookings");
        Ok(rows)
    }

    /// Read all rows, logging and returning an empty list on any failure.
    pub async fn load(&self) -> Vec<BookingRow> {
        match self.try_load().await {
            Ok(rows) => rows,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to load bookings, starting empty");
                Vec::new()
            }
        }
    }

    /// Replace the file with the first `max` rows.
    ///
    /// The content is written to a sibling temp file and renamed over the
    /// target, so readers see either the old or the new list.
    pub async fn save(&self, rows: &[BookingRow], max: usize) -> DbResult<()> {
        let rows = &rows[..rows.len().min(max)];
        let json = serde_json::to_vec_pretty(rows)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|source| self.io_error(source))?;

        if let Err(source) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(self.io_error(source));
        }

        debug!(path = %self.path.display(), count = rows.len(), "Saved bookings");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> DbError {
        DbError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(id: &str, confirmed: bool) -> BookingRow {
        BookingRow {
            id: id.to_string(),
            venue_name: "Azure Room".to_string(),
            party_size: 4,
            time: "2024-01-01T12:00:00.000Z".to_string(),
            is_confirmed: confirmed,
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let file = BookingFile::new(dir.path().join("bookings.json"));

        assert!(file.try_load().await.unwrap().is_empty());
        assert!(file.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let file = BookingFile::new(&path);

        assert!(matches!(
            file.try_load().await,
            Err(DbError::Serialization(_))
        ));
        assert!(file.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_mistyped_rows_are_skipped_individually() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookings.json");
        std::fs::write(
            &path,
            r#"[
                {"id":"b3","venueName":null,"partySize":2,"time":"2024-01-01T12:00:00.000Z","isConfirmed":false},
                {"id":"b2","venueName":"Ruby Quarters","partySize":"3","time":"2024-01-01T12:00:00.000Z","isConfirmed":false},
                {"id":"bx","partySize":2,"time":"2024-01-01T12:00:00.000Z"},
                "not an object",
                {"id":"b1","venueName":"Azure Room","partySize":4,"time":"2024-01-01T12:00:00.000Z","isConfirmed":true}
            ]"#,
        )
        .unwrap();
        let file = BookingFile::new(&path);

        let rows = file.try_load().await.unwrap();

        assert_eq!(rows, vec![row("b1", true)]);
    }

    #[tokio::test]
    async fn test_non_array_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookings.json");
        std::fs::write(&path, r#"{"id":"b1"}"#).unwrap();
        let file = BookingFile::new(&path);

        assert!(file.try_load().await.is_err());
        assert!(file.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let file = BookingFile::new(dir.path().join("bookings.json"));
        let rows = vec![row("b3", false), row("b2", true), row("b1", false)];

        file.save(&rows, 50).await.unwrap();

        assert_eq!(file.load().await, rows);
        assert!(!file.tmp_path().exists());
    }

    #[tokio::test]
    async fn test_save_truncates_to_bound() {
        let dir = TempDir::new().unwrap();
        let file = BookingFile::new(dir.path().join("bookings.json"));
        let rows = vec![row("b3", false), row("b2", false), row("b1", false)];

        file.save(&rows, 2).await.unwrap();

        let loaded = file.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "b3");
        assert_eq!(loaded[1].id, "b2");
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let file = BookingFile::new(dir.path().join("data/nested/bookings.json"));

        file.save(&[row("b1", false)], 50).await.unwrap();

        assert_eq!(file.load().await.len(), 1);
    }

    #[test]
    fn test_row_uses_camel_case_fields() {
        let json = serde_json::to_value(row("b1", true)).unwrap();
        assert_eq!(json["venueName"], "Azure Room");
        assert_eq!(json["partySize"], 4);
        assert_eq!(json["isConfirmed"], true);
    }
}
