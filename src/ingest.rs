// Ingest pipeline: Dire Wolf CSV log -> position store

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::constants::{FIELD_COMMENT, FIELD_ISOTIME, FIELD_LATITUDE, FIELD_LONGITUDE, FIELD_SOURCE};
use crate::error::{BridgeError, Result};
use crate::store::PositionStore;
use crate::validate::{self, RawRecord};

/// Outcome of one ingest pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Rows seen, including ones that failed validation
    pub rows: usize,
    /// Rows that reached the store
    pub admitted: usize,
    /// Admitted rows that replaced an existing station entry
    pub replaced: usize,
    /// The consumed hook ran without error after the batch
    pub consumed: bool,
}

impl IngestReport {
    pub fn rejected(&self) -> usize {
        self.rows - self.admitted
    }
}

/// Validate each row in order and upsert the valid ones.
///
/// Invalid rows are expected (partial radio decodes, header lines) and are
/// skipped without error.
pub fn ingest<I>(store: &mut PositionStore, rows: I) -> IngestReport
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut report = IngestReport::default();
    for row in rows {
        report.rows += 1;
        match validate::admit(&row) {
            Some(entry) => {
                report.admitted += 1;
                if store.upsert(entry).is_some() {
                    report.replaced += 1;
                }
            }
            None => trace!("Skipping invalid row: {:?}", row),
        }
    }
    report
}

/// Read header-less Dire Wolf CSV rows.
///
/// Short rows leave the missing columns as `None`; invalid UTF-8 is replaced.
/// A row the CSV parser cannot make sense of is dropped; only I/O failures
/// are returned as errors.
pub fn read_records<R: Read>(reader: R) -> std::result::Result<Vec<RawRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut row = csv::ByteRecord::new();
    loop {
        match csv_reader.read_byte_record(&mut row) {
            Ok(true) => records.push(raw_record(&row)),
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => debug!("Skipping unreadable CSV row: {}", e),
        }
    }
    Ok(records)
}

fn raw_record(row: &csv::ByteRecord) -> RawRecord {
    let field = |index: usize| row.get(index).map(|b| String::from_utf8_lossy(b).into_owned());
    RawRecord {
        isotime: field(FIELD_ISOTIME),
        source: field(FIELD_SOURCE),
        latitude: field(FIELD_LATITUDE),
        longitude: field(FIELD_LONGITUDE),
        comment: field(FIELD_COMMENT),
    }
}

/// The Dire Wolf CSV log on disk.
#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
    clear_after_reading: bool,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>, clear_after_reading: bool) -> Self {
        CsvLog { path: path.into(), clear_after_reading }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row currently in the log. `Ok(None)` when the log does not exist yet.
    pub fn read(&self) -> Result<Option<Vec<RawRecord>>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BridgeError::io(&self.path, e)),
        };
        read_records(file)
            .map(Some)
            .map_err(|e| BridgeError::csv(&self.path, e))
    }

    /// Signal that everything read so far is in the store.
    ///
    /// When clearing is enabled the log is truncated here; otherwise rotation
    /// is left to something external (logrotate, cron) and this is a no-op.
    /// Returns whether the log was truncated.
    pub fn mark_consumed(&self) -> Result<bool> {
        if !self.clear_after_reading {
            return Ok(false);
        }
        File::create(&self.path).map_err(|e| BridgeError::io(&self.path, e))?;
        Ok(true)
    }

    /// Read the log into `store`, then mark it consumed.
    ///
    /// Returns `None` when there was no log to read; the store is untouched
    /// and nothing is truncated in that case. A failed truncate is logged and
    /// reported through `IngestReport::consumed`; the rows stay in the store
    /// and will be read again next time, which the upsert makes harmless.
    pub fn ingest_into(&self, store: &mut PositionStore) -> Result<Option<IngestReport>> {
        let rows = match self.read()? {
            Some(rows) => rows,
            None => {
                trace!("No log at {}", self.path.display());
                return Ok(None);
            }
        };
        let mut report = ingest(store, rows);
        match self.mark_consumed() {
            Ok(_) => report.consumed = true,
            Err(e) => warn!("Could not clear log, rows will be read again: {}", e),
        }
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "0,1704067200,2024-01-01T00:00:00Z,N0CALL,N0CALL,50,0,!,,/>,33.1,-112.1,0,0,,,,,,,,test\n";

    fn raw(source: &str, isotime: &str, lat: &str, lon: &str) -> RawRecord {
        RawRecord {
            isotime: Some(isotime.to_string()),
            source: Some(source.to_string()),
            latitude: Some(lat.to_string()),
            longitude: Some(lon.to_string()),
            comment: Some(String::new()),
        }
    }

    #[test]
    fn test_read_records_maps_columns() {
        let records = read_records(ROW.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.isotime.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(r.source.as_deref(), Some("N0CALL"));
        assert_eq!(r.latitude.as_deref(), Some("33.1"));
        assert_eq!(r.longitude.as_deref(), Some("-112.1"));
        assert_eq!(r.comment.as_deref(), Some("test"));
    }

    #[test]
    fn test_read_records_short_row() {
        let records = read_records("0,1704067200,2024-01-01T00:00:00Z,N0CALL\n".as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source.as_deref(), Some("N0CALL"));
        assert!(records[0].latitude.is_none());
        assert!(records[0].comment.is_none());
    }

    #[test]
    fn test_read_records_quoted_comment_and_bad_utf8() {
        let mut data = b"0,1,2024-01-01T00:00:00Z,N0CALL,N0CALL,50,0,!,,/>,33.1,-112.1,0,0,,,,,,,,\"hello, world \xff\"\n".to_vec();
        data.extend_from_slice(ROW.as_bytes());
        let records = read_records(&data[..]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].comment.as_deref(), Some("hello, world \u{FFFD}"));
    }

    #[test]
    fn test_header_row_is_skipped() {
        let header = crate::constants::LOG_FIELD_NAMES.join(",");
        let data = format!("{}\n{}", header, ROW);
        let mut store = PositionStore::new();
        let report = ingest(&mut store, read_records(data.as_bytes()).unwrap());
        assert_eq!(report.rows, 2);
        assert_eq!(report.admitted, 1);
        assert_eq!(report.rejected(), 1);
        assert!(!store.contains("source"));
    }

    #[test]
    fn test_ingest_dedupes_last_write_wins() {
        let mut store = PositionStore::new();
        let rows = vec![
            raw("N0CALL", "2024-01-01T01:00:00Z", "33.1", "-112.1"),
            raw("N0CALL", "2024-01-01T00:00:00Z", "34.2", "-112.1"),
        ];
        let report = ingest(&mut store, rows);
        assert_eq!(report.admitted, 2);
        assert_eq!(report.replaced, 1);
        assert_eq!(store.len(), 1);
        let entry = store.get("N0CALL").unwrap();
        assert_eq!(entry.latitude, 34.2);
        assert_eq!(entry.isotime, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_ingest_rejects_out_of_range_latitude() {
        let mut store = PositionStore::new();
        let report = ingest(&mut store, vec![raw("N0CALL", "2024-01-01T00:00:00Z", "95.0", "-112.1")]);
        assert_eq!(report.admitted, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_row_does_not_abort_batch() {
        let mut store = PositionStore::new();
        let rows = vec![
            raw("BAD", "not a time", "33.1", "-112.1"),
            raw("GOOD", "2024-01-01T00:00:00Z", "33.1", "-112.1"),
        ];
        ingest(&mut store, rows);
        assert!(store.contains("GOOD"));
        assert!(!store.contains("BAD"));
    }

    #[test]
    fn test_missing_log_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvLog::new(dir.path().join("aprs.log"), true);
        let mut store = PositionStore::new();
        assert_eq!(log.ingest_into(&mut store).unwrap(), None);
        assert!(store.is_empty());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_ingest_into_truncates_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aprs.log");
        std::fs::write(&path, ROW).unwrap();

        let log = CsvLog::new(&path, true);
        let mut store = PositionStore::new();
        let report = log.ingest_into(&mut store).unwrap().unwrap();
        assert_eq!(report.admitted, 1);
        assert!(report.consumed);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_ingest_into_keeps_log_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aprs.log");
        std::fs::write(&path, ROW).unwrap();

        let log = CsvLog::new(&path, false);
        let mut store = PositionStore::new();
        assert!(log.ingest_into(&mut store).unwrap().unwrap().consumed);
        assert!(!log.mark_consumed().unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ROW);
        assert!(store.contains("N0CALL"));
    }

    #[test]
    fn test_failed_truncate_keeps_rows_and_reports_unconsumed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aprs.log");
        std::fs::write(&path, ROW).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&path, perms).unwrap();
        if std::fs::OpenOptions::new().write(true).open(&path).is_ok() {
            // Running with privileges that ignore permission bits.
            return;
        }

        let log = CsvLog::new(&path, true);
        let mut store = PositionStore::new();
        let report = log.ingest_into(&mut store).unwrap().unwrap();
        assert_eq!(report.admitted, 1);
        assert!(!report.consumed);
        assert!(store.contains("N0CALL"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ROW);
    }
}
