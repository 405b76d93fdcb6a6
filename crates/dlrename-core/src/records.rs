use crate::config::DuplicatePolicy;
use crate::error::Error;
use crate::matcher::canonical_identifier;
use crate::model::PurchaseRecord;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const IDENTIFIER_COLUMNS: &[&str] = &["rj_number", "identifier", "id"];
const TITLE_COLUMN: &str = "title";
const DATE_COLUMN: &str = "purchase_date";

const DATETIME_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d"];

/// A data-file row before it is folded into the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the data file, header included.
    pub row_number: usize,
    pub identifier: String,
    pub title: String,
    pub purchase_date: Option<String>,
}

/// Parse a purchase date, discarding the time of day.
pub fn parse_purchase_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

/// Identifier → record lookup built from the purchase export.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    records: HashMap<String, PurchaseRecord>,
}

impl RecordIndex {
    pub fn from_rows<I>(rows: I, policy: DuplicatePolicy) -> Self
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut records: HashMap<String, PurchaseRecord> = HashMap::new();

        for row in rows {
            let identifier = canonical_identifier(&row.identifier);
            let title = row.title.trim().to_string();

            if identifier.is_empty() {
                warn!("Row {}: Missing identifier, skipping", row.row_number);
                continue;
            }
            if title.is_empty() {
                warn!("Row {}: Missing title for {}, skipping", row.row_number, identifier);
                continue;
            }

            let purchase_date = match row.purchase_date.as_deref() {
                Some(raw) if !raw.trim().is_empty() => {
                    let parsed = parse_purchase_date(raw);
                    if parsed.is_none() {
                        warn!(
                            "Row {}: Failed to parse purchase date {:?} for {}",
                            row.row_number, raw, identifier
                        );
                    }
                    parsed
                }
                _ => None,
            };

            let record = PurchaseRecord {
                identifier: identifier.clone(),
                title,
                purchase_date,
            };

            if records.contains_key(&identifier) {
                match policy {
                    DuplicatePolicy::LastWins => {
                        warn!(
                            "Row {}: {} appears again, replacing the earlier row",
                            row.row_number, identifier
                        );
                        records.insert(identifier, record);
                    }
                    DuplicatePolicy::FirstWins => {
                        warn!(
                            "Row {}: {} appears again, keeping the earlier row",
                            row.row_number, identifier
                        );
                    }
                }
            } else {
                records.insert(identifier, record);
            }
        }

        debug!("Record index built with {} identifiers", records.len());
        Self { records }
    }

    /// Read a UTF-8 CSV export (with or without BOM) that has a header row.
    pub fn from_reader<R: Read>(mut reader: R, policy: DuplicatePolicy) -> Result<Self, Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let id_col = IDENTIFIER_COLUMNS
            .iter()
            .find_map(|name| column(name))
            .ok_or_else(|| Error::MissingColumn(IDENTIFIER_COLUMNS.join("|")))?;
        let title_col = column(TITLE_COLUMN).ok_or_else(|| Error::MissingColumn(TITLE_COLUMN.to_string()))?;
        let date_col = column(DATE_COLUMN);

        let mut rows = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let record = result?;
            let cell = |col: usize| record.get(col).unwrap_or("").to_string();
            rows.push(RawRow {
                row_number: index + 2,
                identifier: cell(id_col),
                title: cell(title_col),
                purchase_date: date_col.map(cell),
            });
        }

        Ok(Self::from_rows(rows, policy))
    }

    pub fn load(path: &Path, policy: DuplicatePolicy) -> Result<Self, Error> {
        let file = fs::File::open(path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("Error opening {}: {}", path.display(), e))
        })?;
        Self::from_reader(file, policy)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, identifier: &str) -> Option<&PurchaseRecord> {
        self.records.get(&canonical_identifier(identifier))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PurchaseRecord> {
        self.records.values()
    }
}
