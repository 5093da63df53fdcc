// ============================================================
// RECORD STREAMER
// ============================================================
// Lazily parse every resolved file into records, one file at a time.
// A file's records are released only after the whole file parsed cleanly

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::ByteRecord;
use tracing::debug;

use super::{CsvParser, FileOpener};
use crate::domain::csv::{Record, ResolvedFileSet};
use crate::domain::error::{Result, TapError};

/// Produces fresh record sequences over a resolved file set
pub struct RecordStreamer {
    opener: Arc<dyn FileOpener>,
    parser: Arc<CsvParser>,
}

impl RecordStreamer {
    pub fn new(opener: Arc<dyn FileOpener>, parser: Arc<CsvParser>) -> Self {
        Self { opener, parser }
    }

    /// Start a new pull-based sequence over `files`. Nothing is opened
    /// until the first record is requested.
    pub fn stream(&self, files: Arc<ResolvedFileSet>) -> RecordStream {
        RecordStream {
            opener: Arc::clone(&self.opener),
            parser: Arc::clone(&self.parser),
            files,
            next_file: 0,
            current: None,
            finished: false,
        }
    }
}

/// Records of one fully parsed file, waiting to be handed out
struct LoadedFile {
    path: PathBuf,
    records: VecDeque<Record>,
}

/// Finite, non-restartable sequence of records.
///
/// Records carry the keys of their own file's header. Each file is parsed
/// completely before its first record is yielded, so a malformed file
/// contributes no records, only its error. The sequence ends after the
/// first error. At most one file handle is open at any time, and only
/// while that file is being read.
pub struct RecordStream {
    opener: Arc<dyn FileOpener>,
    parser: Arc<CsvParser>,
    files: Arc<ResolvedFileSet>,
    next_file: usize,
    current: Option<LoadedFile>,
    finished: bool,
}

impl RecordStream {
    /// Path of the file whose records are being handed out, if any
    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_ref().map(|f| f.path.as_path())
    }

    fn load(&self, path: &Path) -> Result<LoadedFile> {
        let source = self.opener.open(path).map_err(|source| TapError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = self.parser.reader(source);
        let headers = self.parser.read_headers(path, &mut reader)?;

        let mut records = VecDeque::new();
        let mut buffer = ByteRecord::new();
        let mut row = 1;
        while self.parser.read_row(path, row, &mut reader, &mut buffer)? {
            records.push_back(self.parser.decode_row(path, row, &headers, &buffer)?);
            row += 1;
        }

        debug!(
            path = %path.display(),
            columns = headers.len(),
            rows = records.len(),
            "Loaded source file"
        );
        Ok(LoadedFile {
            path: path.to_path_buf(),
            records,
        })
    }

    fn fail(&mut self, error: TapError) -> Option<Result<Record>> {
        self.current = None;
        self.finished = true;
        Some(Err(error))
    }
}

impl Iterator for RecordStream {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(record) = self.current.as_mut().and_then(|f| f.records.pop_front()) {
                return Some(Ok(record));
            }
            self.current = None;

            let Some(path) = self.files.files().get(self.next_file).cloned() else {
                self.finished = true;
                return None;
            };
            self.next_file += 1;

            match self.load(&path) {
                Ok(file) => self.current = Some(file),
                Err(e) => return self.fail(e),
            }
        }
    }
}

impl FusedIterator for RecordStream {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv::{DialectConfig, DialectOptions};
    use crate::infrastructure::csv::LocalFileOpener;
    use std::fs;
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn streamer(dialect: &DialectConfig) -> RecordStreamer {
        RecordStreamer::new(
            Arc::new(LocalFileOpener),
            Arc::new(CsvParser::new(dialect).unwrap()),
        )
    }

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_two_row_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "people.csv", b"id,name\n1,Alice\n2,Bob\n");
        let files = Arc::new(ResolvedFileSet::new(vec![path], vec![]));

        let records: Vec<Record> = streamer(&DialectConfig::default())
            .stream(files)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            records,
            vec![
                record(&[("id", "1"), ("name", "Alice")]),
                record(&[("id", "2"), ("name", "Bob")]),
            ]
        );
    }

    #[test]
    fn test_files_in_order_with_own_headers() {
        let temp_dir = TempDir::new().unwrap();
        let first = write(&temp_dir, "b.csv", b"id,name\n1,Alice\n");
        let second = write(&temp_dir, "a.csv", b"id,email\n2,bob@example.com\n");
        let files = Arc::new(ResolvedFileSet::new(vec![first, second], vec![]));

        let records: Vec<Record> = streamer(&DialectConfig::default())
            .stream(files)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record(&[("id", "1"), ("name", "Alice")]));
        // Divergent headers are passed through, not reconciled
        assert_eq!(records[1], record(&[("id", "2"), ("email", "bob@example.com")]));
    }

    #[test]
    fn test_exhausted_stream_stays_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "one.csv", b"id\n1\n");
        let files = Arc::new(ResolvedFileSet::new(vec![path], vec![]));
        let streamer = streamer(&DialectConfig::default());

        let mut stream = streamer.stream(Arc::clone(&files));
        assert_eq!(stream.by_ref().count(), 1);
        assert!(stream.next().is_none());

        assert_eq!(streamer.stream(files).count(), 1);
    }

    #[test]
    fn test_malformed_file_yields_no_records() {
        let temp_dir = TempDir::new().unwrap();
        let good = write(&temp_dir, "good.csv", b"id,city\n4,Oslo\n");
        let bad = write(&temp_dir, "bad.csv", b"id,city\n1,Paris\n2,M\xfcnchen\n3,Rome\n");
        let after = write(&temp_dir, "after.csv", b"id,city\n5,Lima\n");
        let files = Arc::new(ResolvedFileSet::new(vec![good, bad.clone(), after], vec![]));

        let items: Vec<Result<Record>> = streamer(&DialectConfig::default()).stream(files).collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap()["city"], "Oslo");
        match &items[1] {
            Err(TapError::RowParse { path, row, .. }) => {
                assert_eq!(path, &bad);
                assert_eq!(*row, 2);
            }
            other => panic!("expected row parse error, got {other:?}"),
        }
        // Rows before the bad one are never handed out
        assert!(!items
            .iter()
            .any(|item| matches!(item, Ok(record) if record["city"] == "Paris")));
    }

    #[test]
    fn test_error_ends_the_stream() {
        let temp_dir = TempDir::new().unwrap();
        let bad = write(&temp_dir, "bad.csv", b"a,b\n1,2\n3\n");
        let files = Arc::new(ResolvedFileSet::new(vec![bad], vec![]));

        let mut stream = streamer(&DialectConfig::default()).stream(files);

        assert!(matches!(stream.next(), Some(Err(TapError::RowParse { row: 2, .. }))));
        assert!(stream.next().is_none());
        assert!(stream.current_file().is_none());
    }

    #[test]
    fn test_numeric_normalization() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "prices.csv", b"item;price\nlamp;\"1.234,56\"\n");
        let files = Arc::new(ResolvedFileSet::new(vec![path], vec![]));
        let dialect = DialectConfig::resolve(&DialectOptions {
            delimiter: Some(";".to_string()),
            thousands: Some(".".to_string()),
            decimal: Some(",".to_string()),
            ..Default::default()
        })
        .unwrap();

        let records: Vec<Record> = streamer(&dialect)
            .stream(files)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records[0]["price"], "1234.56");
        assert_eq!(records[0]["price"].parse::<f64>().unwrap(), 1234.56);
    }

    #[test]
    fn test_file_removed_after_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "gone.csv", b"id\n1\n");
        let files = Arc::new(ResolvedFileSet::new(vec![path.clone()], vec![]));
        fs::remove_file(&path).unwrap();

        let mut stream = streamer(&DialectConfig::default()).stream(files);

        assert!(matches!(stream.next(), Some(Err(TapError::FileOpen { .. }))));
        assert!(stream.next().is_none());
    }

    /// Counts handles that are currently open and the most ever open at once
    struct TrackingOpener {
        open: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    struct TrackedReader {
        inner: fs::File,
        open: Arc<AtomicUsize>,
    }

    impl Read for TrackedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Drop for TrackedReader {
        fn drop(&mut self) {
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl FileOpener for TrackingOpener {
        fn open(&self, path: &Path) -> std::io::Result<Box<dyn Read + Send>> {
            let inner = fs::File::open(path)?;
            let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            Ok(Box::new(TrackedReader {
                inner,
                open: Arc::clone(&self.open),
            }))
        }
    }

    #[test]
    fn test_handles_released() {
        let temp_dir = TempDir::new().unwrap();
        let a = write(&temp_dir, "a.csv", b"id\n1\n2\n");
        let b = write(&temp_dir, "b.csv", b"id\n3\n");
        let files = Arc::new(ResolvedFileSet::new(vec![a, b], vec![]));

        let open = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let streamer = RecordStreamer::new(
            Arc::new(TrackingOpener {
                open: Arc::clone(&open),
                peak: Arc::clone(&peak),
            }),
            Arc::new(CsvParser::new(&DialectConfig::default()).unwrap()),
        );

        // The handle is closed once its file has been read
        let mut stream = streamer.stream(Arc::clone(&files));
        stream.next().unwrap().unwrap();
        assert_eq!(open.load(Ordering::SeqCst), 0);
        assert!(stream.current_file().unwrap().ends_with("a.csv"));
        drop(stream);

        let ids: Vec<String> = streamer
            .stream(files)
            .map(|record| record.unwrap()["id"].clone())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(open.load(Ordering::SeqCst), 0);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
