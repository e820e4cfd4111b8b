use crate::constants::{
    required_columns, COL_CATEGORIES, COL_ID, COL_MAX_RATING, COL_RATING, COL_REVIEW_COUNT,
    COL_TIMEZONE, DAYS_OF_WEEK,
};
use crate::domain::{Business, BusinessRecord, DayHours, DayOfWeek};
use crate::error::{DirectoryError, Result};
use crate::ingest::categories::split_categories;
use crate::ingest::hours::parse_hours;
use chrono_tz::Tz;
use csv::StringRecord;
use std::collections::HashMap;

/// Header-name to column-index mapping, validated against the export contract.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    name_to_index: HashMap<String, usize>,
}

impl ColumnMap {
    /// Builds the mapping from the file header and fails with the full list
    /// of missing columns when the contract is not met. Column order is free;
    /// only presence-by-name matters.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut name_to_index = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            name_to_index.insert(header.trim().to_string(), index);
        }

        let missing: Vec<&str> = required_columns()
            .into_iter()
            .filter(|col| !name_to_index.contains_key(*col))
            .collect();
        if !missing.is_empty() {
            return Err(DirectoryError::SchemaContract(missing.join(", ")));
        }

        Ok(Self { name_to_index })
    }

    /// Trimmed cell value for a validated column; a short row reads as empty.
    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.name_to_index
            .get(column)
            .and_then(|&index| record.get(index))
            .unwrap_or("")
            .trim()
    }
}

/// One successfully parsed row plus any field-level warnings recovered along
/// the way (unparseable hours text for some day, for example).
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub record: BusinessRecord,
    pub warnings: Vec<String>,
}

/// Parses one CSV row into a normalized record. Pure transform: any invalid
/// identity/numeric/timezone field fails the row (the caller skips it and
/// the batch continues); hours text failures degrade to warnings per §4.3.
pub fn parse_row(map: &ColumnMap, record: &StringRecord, row: usize) -> Result<ParsedRow> {
    let id = parse_i64(map.get(record, COL_ID), row, "ID")?;
    let timezone = map.get(record, COL_TIMEZONE);
    if timezone.parse::<Tz>().is_err() {
        return Err(DirectoryError::RowParse {
            row,
            field: "timezone",
            reason: format!("unknown IANA zone '{}'", timezone),
        });
    }
    let rating = parse_f64(map.get(record, COL_RATING), row, "Rating")?;
    let max_rating = parse_f64(map.get(record, COL_MAX_RATING), row, "Max Rating")?;
    let review_count = parse_i64(map.get(record, COL_REVIEW_COUNT), row, "Review Count")?;
    if review_count < 0 {
        return Err(DirectoryError::RowParse {
            row,
            field: "Review Count",
            reason: format!("negative count {}", review_count),
        });
    }

    let categories = split_categories(map.get(record, COL_CATEGORIES));

    let mut hours = Vec::with_capacity(DAYS_OF_WEEK.len());
    let mut warnings = Vec::new();
    for (day, column) in DayOfWeek::ALL.iter().zip(DAYS_OF_WEEK.iter()) {
        let parsed = parse_hours(map.get(record, column));
        for warning in parsed.warnings {
            warnings.push(format!("{}: {}", column, warning));
        }
        hours.push(DayHours {
            day: *day,
            shifts: parsed.shifts,
        });
    }

    Ok(ParsedRow {
        record: BusinessRecord {
            business: Business {
                id,
                timezone: timezone.to_string(),
                rating,
                max_rating,
                review_count,
            },
            categories,
            hours,
        },
        warnings,
    })
}

fn parse_i64(value: &str, row: usize, field: &'static str) -> Result<i64> {
    value.parse::<i64>().map_err(|_| DirectoryError::RowParse {
        row,
        field,
        reason: format!("'{}' is not an integer", value),
    })
}

fn parse_f64(value: &str, row: usize, field: &'static str) -> Result<f64> {
    value.parse::<f64>().map_err(|_| DirectoryError::RowParse {
        row,
        field,
        reason: format!("'{}' is not numeric", value),
    })
}
