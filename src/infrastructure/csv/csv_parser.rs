// ============================================================
// CSV PARSER
// ============================================================
// Tokenize delimited text per dialect and decode fields with the
// configured encoding

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, Reader, ReaderBuilder, Trim};
use encoding_rs::{DecoderResult, Encoding};

use super::initial_space::InitialSpaceFilter;
use super::numeric::NumberFormat;
use crate::domain::csv::{DialectConfig, EncodingErrors, Record};
use crate::domain::error::{Result, TapError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Dialect-bound parser shared by schema inference and record streaming
#[derive(Debug, Clone)]
pub struct CsvParser {
    dialect: DialectConfig,
    numbers: Option<NumberFormat>,
}

impl CsvParser {
    pub fn new(dialect: &DialectConfig) -> Result<Self> {
        Ok(Self {
            dialect: dialect.clone(),
            numbers: NumberFormat::for_dialect(dialect)?,
        })
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    /// Build a reader over raw bytes. Records are read as bytes and decoded
    /// field by field, so non-UTF-8 encodings and decode errors can be
    /// attributed to a row. Spaces after delimiters are dropped ahead of
    /// the tokenizer when `skipinitialspace` is set.
    pub fn reader<R: Read>(&self, source: R) -> Reader<InitialSpaceFilter<R>> {
        ReaderBuilder::new()
            .delimiter(self.dialect.delimiter)
            .quote(self.dialect.quotechar)
            .double_quote(self.dialect.doublequote)
            .escape(self.dialect.escapechar)
            .has_headers(true)
            .flexible(false) // Rows must match the header width
            .trim(Trim::None)
            .from_reader(InitialSpaceFilter::new(source, &self.dialect))
    }

    /// Read and decode the header row, making column names unique
    pub fn read_headers<R: Read>(
        &self,
        path: &Path,
        reader: &mut Reader<R>,
    ) -> Result<Vec<String>> {
        let raw = reader
            .byte_headers()
            .map_err(|e| TapError::header_read(path, e))?;

        let mut names = Vec::with_capacity(raw.len());
        for (idx, field) in raw.iter().enumerate() {
            let field = if idx == 0 {
                field.strip_prefix(UTF8_BOM).unwrap_or(field)
            } else {
                field
            };
            let name = self
                .decode_field(field)
                .map_err(|message| TapError::header_read(path, message))?;
            names.push(name.into_owned());
        }

        if names.is_empty() {
            return Err(TapError::header_read(path, "file has no columns"));
        }

        Ok(unique_headers(names))
    }

    /// Pull the next raw row. `row` is the 1-based data row number used in
    /// error messages.
    pub fn read_row<R: Read>(
        &self,
        path: &Path,
        row: u64,
        reader: &mut Reader<R>,
        buffer: &mut ByteRecord,
    ) -> Result<bool> {
        reader
            .read_byte_record(buffer)
            .map_err(|e| TapError::row_parse(path, row, e))
    }

    /// Decode a raw row into a record keyed by `headers`
    pub fn decode_row(
        &self,
        path: &Path,
        row: u64,
        headers: &[String],
        raw: &ByteRecord,
    ) -> Result<Record> {
        let mut record = Record::with_capacity(headers.len());

        for (header, field) in headers.iter().zip(raw.iter()) {
            let text = self
                .decode_field(field)
                .map_err(|message| TapError::row_parse(path, row, message))?;

            let value = match self.numbers.as_ref().and_then(|n| n.normalize(&text)) {
                Some(canonical) => canonical,
                None => text.into_owned(),
            };
            record.insert(header.clone(), value);
        }

        Ok(record)
    }

    fn decode_field<'a>(&self, bytes: &'a [u8]) -> std::result::Result<Cow<'a, str>, String> {
        let encoding = self.dialect.encoding;

        match self.dialect.encoding_errors {
            EncodingErrors::Strict => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or_else(|| format!("invalid {} byte sequence", encoding.name())),
            EncodingErrors::Replace => Ok(encoding.decode_without_bom_handling(bytes).0),
            EncodingErrors::Ignore => Ok(
                match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
                    Some(text) => text,
                    None => Cow::Owned(decode_skipping_malformed(encoding, bytes)),
                },
            ),
        }
    }

}

/// Decode `bytes`, leaving out malformed sequences. U+FFFD characters that
/// are genuinely present in the input are kept.
fn decode_skipping_malformed(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut text = String::with_capacity(bytes.len());
    let mut input = bytes;

    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(input, &mut text, true);
        input = &input[read..];
        match result {
            DecoderResult::InputEmpty => return text,
            DecoderResult::Malformed(_, _) => {}
            DecoderResult::OutputFull => {
                let needed = decoder
                    .max_utf8_buffer_length_without_replacement(input.len())
                    .unwrap_or(input.len() * 3 + 16);
                text.reserve(needed);
            }
        }
    }
}

/// Suffix repeated column names with `.1`, `.2`, ... so record keys stay
/// unique. The first occurrence keeps its name.
pub fn unique_headers(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.clone();
        let counter = counters.entry(name.clone()).or_insert(0);
        while seen.contains(&candidate) {
            *counter += 1;
            candidate = format!("{}.{}", name, counter);
        }
        seen.insert(candidate.clone());
        unique.push(candidate);
    }

    unique
}
