//! Daily-count CSV ingestion.
//!
//! The source table has one row per location with `Lat`, `Long` and one
//! column per day (`D1_22` .. `D3_12`). Any other columns are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use foundation::{DayIndex, DAY_COUNT};
use scene::{LocationRow, RowError, RowStore};

pub const LATITUDE_COLUMN: &str = "Lat";
pub const LONGITUDE_COLUMN: &str = "Long";

#[derive(Debug)]
pub enum DatasetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    MissingColumn(String),
    UnterminatedQuote {
        line: usize,
    },
    ShortRecord {
        line: usize,
        expected: usize,
        found: usize,
    },
    BadNumber {
        line: usize,
        column: String,
        value: String,
    },
    Row {
        line: usize,
        source: RowError,
    },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            DatasetError::MissingColumn(name) => write!(f, "missing column {name:?}"),
            DatasetError::UnterminatedQuote { line } => {
                write!(f, "line {line}: unterminated quoted field")
            }
            DatasetError::ShortRecord {
                line,
                expected,
                found,
            } => write!(f, "line {line}: expected {expected} fields, found {found}"),
            DatasetError::BadNumber {
                line,
                column,
                value,
            } => write!(f, "line {line}: column {column}: {value:?} is not a number"),
            DatasetError::Row { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

impl std::error::Error for DatasetError {}

// Field positions of the columns we read.
struct ColumnMap {
    latitude: usize,
    longitude: usize,
    days: [usize; DAY_COUNT],
    width: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self, DatasetError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        let latitude = find(LATITUDE_COLUMN)?;
        let longitude = find(LONGITUDE_COLUMN)?;
        let mut days = [0usize; DAY_COUNT];
        for day in DayIndex::all() {
            days[day.value_index()] = find(&day.column_name())?;
        }
        let width = days
            .iter()
            .copied()
            .chain([latitude, longitude])
            .max()
            .unwrap_or(0)
            + 1;
        Ok(Self {
            latitude,
            longitude,
            days,
            width,
        })
    }
}

/// Parses the CSV text into rows, in file order.
///
/// Blank lines are skipped. An empty day cell counts as no observation.
/// Quoted fields may span lines; errors name the line a record starts on.
/// Input without any data rows yields an empty store.
pub fn parse_dataset_csv(input: &str) -> Result<RowStore, DatasetError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut records = split_records(input)?.into_iter();

    let Some((_, header)) = records.next() else {
        return Ok(RowStore::new());
    };
    let columns = ColumnMap::from_header(&header)?;

    let mut store = RowStore::new();
    let mut values = [0.0f64; DAY_COUNT];
    for (line, fields) in records {
        if fields.len() < columns.width {
            return Err(DatasetError::ShortRecord {
                line,
                expected: header.len(),
                found: fields.len(),
            });
        }

        let latitude = parse_number(&fields[columns.latitude], LATITUDE_COLUMN, line)?;
        let longitude = parse_number(&fields[columns.longitude], LONGITUDE_COLUMN, line)?;
        for day in DayIndex::all() {
            let cell = fields[columns.days[day.value_index()]].trim();
            values[day.value_index()] = if cell.is_empty() {
                0.0
            } else {
                parse_number(cell, &day.column_name(), line)?
            };
        }

        let row = LocationRow::new(latitude, longitude, &values)
            .map_err(|source| DatasetError::Row { line, source })?;
        store.push(row);
    }

    tracing::info!(rows = store.len(), "dataset parsed");
    Ok(store)
}

pub fn load_dataset_file(path: impl AsRef<Path>) -> Result<RowStore, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset_csv(&text)
}

fn parse_number(cell: &str, column: &str, line: usize) -> Result<f64, DatasetError> {
    cell.trim()
        .parse::<f64>()
        .map_err(|_| DatasetError::BadNumber {
            line,
            column: column.to_string(),
            value: cell.to_string(),
        })
}

/// Splits CSV text into records tagged with the line each starts on.
///
/// Double-quoted fields may contain commas and line breaks, and a doubled
/// quote inside them is a literal quote. Blank lines produce no record.
fn split_records(input: &str) -> Result<Vec<(usize, Vec<String>)>, DatasetError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            '\n' if in_quotes => {
                line += 1;
                field.push(c);
            }
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, start, std::mem::take(&mut fields));
                line += 1;
                start = line;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err(DatasetError::UnterminatedQuote { line: start });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, start, fields);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    let blank = fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push((line, fields));
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_dataset_csv, split_records, DatasetError};
    use foundation::{DayIndex, DAY_COUNT};
    use pretty_assertions::assert_eq;

    fn header() -> String {
        let mut cols = vec![
            "Province/State".to_string(),
            "Country/Region".to_string(),
            "Lat".to_string(),
            "Long".to_string(),
        ];
        cols.extend(DayIndex::all().map(|d| d.column_name()));
        cols.join(",")
    }

    fn record(prefix: &str, values: &[&str]) -> String {
        format!("{prefix},{}", values.join(","))
    }

    #[test]
    fn splits_quoted_fields() {
        let records = split_records(r#"a,"b, c","say ""hi""",,d"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1, vec!["a", "b, c", "say \"hi\"", "", "d"]);
    }

    #[test]
    fn quoted_field_may_span_lines() {
        let records = split_records("a,\"two\r\nlines\",b\r\n\r\nc,d\n").unwrap();
        assert_eq!(
            records,
            vec![
                (1, vec!["a".to_string(), "two\r\nlines".to_string(), "b".to_string()]),
                (4, vec!["c".to_string(), "d".to_string()]),
            ]
        );

        let values = vec!["2"; DAY_COUNT];
        let csv = format!(
            "{}\n{}\n{}\n",
            header(),
            record("\"Diamond\nPrincess\",Others,35.4437,139.638", &values),
            record(",X,south,2", &values),
        );
        match parse_dataset_csv(&csv) {
            Err(DatasetError::BadNumber { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected {other:?}"),
        }

        let csv = format!(
            "{}\n{}\n",
            header(),
            record("\"Diamond\nPrincess\",Others,35.4437,139.638", &values)
        );
        let store = parse_dataset_csv(&csv).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.rows()[0].longitude(), 139.638);
    }

    #[test]
    fn reads_rows_in_file_order() {
        let mut values = vec!["0"; DAY_COUNT];
        values[0] = "5";
        values[50] = "1200";
        let csv = format!(
            "{}\r\n{}\r\n\r\n{}\r\n",
            header(),
            record("Hubei,China,30.9756,112.2707", &values),
            record("\"Bonaire, Sint Eustatius and Saba\",Netherlands,12.18,-68.24", &vec!["0"; DAY_COUNT]),
        );
        let store = parse_dataset_csv(&csv).unwrap();
        assert_eq!(store.len(), 2);
        let first = &store.rows()[0];
        assert_eq!(first.latitude(), 30.9756);
        assert_eq!(first.longitude(), 112.2707);
        assert_eq!(first.day_value(DayIndex::FIRST), 5.0);
        assert_eq!(first.day_value(DayIndex::LAST), 1200.0);
        assert_eq!(store.rows()[1].longitude(), -68.24);
        assert_eq!(store.visible_count(DayIndex::FIRST), 1);
    }

    #[test]
    fn empty_day_cell_is_no_observation() {
        let mut values = vec!["1"; DAY_COUNT];
        values[3] = "";
        let csv = format!("{}\n{}\n", header(), record(",X,1,2", &values));
        let store = parse_dataset_csv(&csv).unwrap();
        assert!(!store.rows()[0].has_observation(DayIndex::new(4).unwrap()));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_dataset_csv(&header()).unwrap().is_empty());
        assert!(parse_dataset_csv("").unwrap().is_empty());
    }

    #[test]
    fn missing_day_column_is_reported() {
        let csv = header().replace(",D2_29", "");
        match parse_dataset_csv(&csv) {
            Err(DatasetError::MissingColumn(name)) => assert_eq!(name, "D2_29"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn errors_carry_line_numbers() {
        let values = vec!["0"; DAY_COUNT];
        let csv = format!("{}\n{}\n", header(), record(",X,north,2", &values));
        match parse_dataset_csv(&csv) {
            Err(DatasetError::BadNumber { line, column, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "Lat");
            }
            other => panic!("unexpected {other:?}"),
        }

        let csv = format!("{}\n\n,X,1,2,3\n", header());
        assert!(matches!(
            parse_dataset_csv(&csv),
            Err(DatasetError::ShortRecord { line: 3, found: 5, .. })
        ));

        let csv = format!("{}\n\"open,X,1,2\n", header());
        assert!(matches!(
            parse_dataset_csv(&csv),
            Err(DatasetError::UnterminatedQuote { line: 2 })
        ));
    }
}
