use csv::{ReaderBuilder, Trim};
use std::io::Read;

use crate::errors::CoreError;

/// Untyped table as read from a ledger source: one header row and string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn with_row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(row);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header, ignoring surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Anything that can produce a `RawTable` from a path.
pub trait TabularSource: Send + Sync {
    /// Fails with `NotFound` when the path is absent and `EmptySource`
    /// when the source has a header but no data rows.
    fn load(&self, path: &str) -> Result<RawTable, CoreError>;
}

/// CSV ledger exports. The delimiter is sniffed from the header line
/// (`,`, `;` or tab) unless set explicitly.
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    delimiter: Option<u8>,
}

impl CsvSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    /// Read a table from any reader. An empty table is not an error here.
    pub fn read<R: Read>(&self, mut reader: R) -> Result<RawTable, CoreError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        self.parse(&content)
    }

    fn parse(&self, content: &str) -> Result<RawTable, CoreError> {
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| sniff_delimiter(content.lines().next().unwrap_or_default()));

        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut table = RawTable {
            headers,
            rows: Vec::new(),
        };
        for record in rdr.records() {
            let record = record?;
            table.push_row(record.iter());
        }
        Ok(table)
    }
}

impl TabularSource for CsvSource {
    fn load(&self, path: &str) -> Result<RawTable, CoreError> {
        log::info!("Loading ledger from {path}");
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_string()),
            _ => CoreError::from(e),
        })?;

        let table = self.parse(&content)?;
        if table.is_empty() {
            return Err(CoreError::EmptySource(path.to_string()));
        }
        log::info!("Loaded {} rows from {path}", table.len());
        Ok(table)
    }
}

fn sniff_delimiter(header_line: &str) -> u8 {
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|d| header_line.bytes().filter(|b| b == d).count())
        .filter(|d| header_line.as_bytes().contains(d))
        .unwrap_or(b',')
}
