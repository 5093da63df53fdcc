// ============================================================
// SCHEMA INFERRER
// ============================================================
// Derive a stream schema from the header and a bounded sample of one file

use std::path::Path;
use std::sync::Arc;

use csv::ByteRecord;
use tracing::{debug, info};

use super::{CsvParser, FileOpener};
use crate::domain::csv::Schema;
use crate::domain::error::{Result, TapError};

/// Number of data rows parsed alongside the header
pub const SAMPLE_SIZE: usize = 100;

pub struct SchemaInferrer {
    opener: Arc<dyn FileOpener>,
    sample_size: usize,
}

impl SchemaInferrer {
    pub fn new(opener: Arc<dyn FileOpener>) -> Self {
        Self {
            opener,
            sample_size: SAMPLE_SIZE,
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Infer the schema of `path`.
    ///
    /// Reads the header plus at most `sample_size` rows; the sample must
    /// parse cleanly under the dialect. Every column is typed as string.
    pub fn infer(&self, path: &Path, parser: &CsvParser) -> Result<Schema> {
        let source = self
            .opener
            .open(path)
            .map_err(|e| TapError::header_read(path, e))?;
        let mut reader = parser.reader(source);
        let headers = parser.read_headers(path, &mut reader)?;

        let mut raw = ByteRecord::new();
        let mut sampled = 0;
        while sampled < self.sample_size {
            let row = sampled as u64 + 1;
            if !parser.read_row(path, row, &mut reader, &mut raw)? {
                break;
            }
            parser.decode_row(path, row, &headers, &raw)?;
            sampled += 1;
        }
        debug!(path = %path.display(), sampled, "Sampled rows for schema inference");

        let schema = Schema::from_columns(headers);
        info!(
            path = %path.display(),
            columns = ?schema.column_names().collect::<Vec<_>>(),
            "Inferred schema with {} columns",
            schema.len()
        );

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv::{DialectConfig, DialectOptions, PropertyType, SchemaProperty};
    use crate::infrastructure::csv::LocalFileOpener;
    use std::fs;
    use tempfile::TempDir;

    fn inferrer() -> SchemaInferrer {
        SchemaInferrer::new(Arc::new(LocalFileOpener))
    }

    fn default_parser() -> CsvParser {
        CsvParser::new(&DialectConfig::default()).unwrap()
    }

    #[test]
    fn test_every_column_is_string() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sales.csv");
        fs::write(&path, "id,name,amount\n1,Alice,10.5\n2,Bob,99\n").unwrap();

        let schema = inferrer().infer(&path, &default_parser()).unwrap();

        assert_eq!(
            schema.properties,
            vec![
                SchemaProperty::string("id"),
                SchemaProperty::string("name"),
                SchemaProperty::string("amount"),
            ]
        );
        assert!(schema
            .properties
            .iter()
            .all(|p| p.property_type == PropertyType::String));
    }

    #[test]
    fn test_header_only_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.csv");
        fs::write(&path, "id,name\n").unwrap();

        let schema = inferrer().infer(&path, &default_parser()).unwrap();

        assert_eq!(schema.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_uses_dialect() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("semi.csv");
        fs::write(&path, "a;b;c\n1;2;3\n").unwrap();

        let dialect = DialectConfig::resolve(&DialectOptions {
            delimiter: Some(";".to_string()),
            ..Default::default()
        })
        .unwrap();
        let parser = CsvParser::new(&dialect).unwrap();

        let schema = inferrer().infer(&path, &parser).unwrap();

        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_empty_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank.csv");
        fs::write(&path, "").unwrap();

        let err = inferrer().infer(&path, &default_parser()).unwrap_err();

        assert!(matches!(err, TapError::HeaderRead { .. }));
    }

    #[test]
    fn test_unopenable_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.csv");

        let err = inferrer().infer(&path, &default_parser()).unwrap_err();

        assert!(matches!(err, TapError::HeaderRead { .. }));
    }

    #[test]
    fn test_sample_is_bounded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("long.csv");
        // Row 4 is malformed but lies outside a 3-row sample
        fs::write(&path, "id,name\n1,a\n2,b\n3,c\n4\n").unwrap();

        let schema = inferrer()
            .with_sample_size(3)
            .infer(&path, &default_parser())
            .unwrap();
        assert_eq!(schema.len(), 2);

        let err = inferrer()
            .with_sample_size(10)
            .infer(&path, &default_parser())
            .unwrap_err();
        assert!(matches!(err, TapError::RowParse { row: 4, .. }));
    }
}
