//! CSV → [`Table`] with per-column type inference.

use csv::{ReaderBuilder, StringRecord, Trim};
use novamart_core::{parse_date, Column, ColumnKind, DashboardError, DashboardResult, Table, Value};
use std::collections::HashSet;
use std::io::Read;
use tracing::debug;

/// Cell spellings treated as missing.
const MISSING_TOKENS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Per-file reading options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Coerce a column literally named `date` to calendar dates.
    pub parse_dates: bool,
    /// Treat the first column as row labels.
    pub first_column_is_index: bool,
}

fn parse_error(file: &str, line: u64, message: impl Into<String>) -> DashboardError {
    DashboardError::Parse {
        file: file.to_string(),
        line,
        message: message.into(),
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

/// Read a delimited table from `reader`. `file` names the source in errors.
pub fn read_table<R: Read>(reader: R, file: &str, opts: ReadOptions) -> DashboardResult<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = dedupe_headers(
        rdr.headers()
            .map_err(|e| parse_error(file, 1, e.to_string()))?
            .iter()
            .map(str::to_string),
    );
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(parse_error(file, 1, "missing header row"));
    }

    let mut records: Vec<StringRecord> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line());
            parse_error(file, line, e.to_string())
        })?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(parse_error(file, 1, "no data rows"));
    }

    let (index, data_start) = if opts.first_column_is_index {
        let labels = records
            .iter()
            .map(|r| r.get(0).unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        (Some(labels), 1)
    } else {
        (None, 0)
    };

    let mut columns = Vec::with_capacity(headers.len().saturating_sub(data_start));
    for (pos, name) in headers.iter().enumerate().skip(data_start) {
        let cells: Vec<&str> = records.iter().map(|r| r.get(pos).unwrap_or_default()).collect();
        let column = if opts.parse_dates && name == "date" {
            date_column(name, &cells, file)?
        } else {
            infer_column(name, &cells)
        };
        columns.push(column);
    }

    let mut table = Table::try_new(columns).map_err(|e| parse_error(file, 1, e.to_string()))?;
    if let Some(labels) = index {
        table = table
            .with_index(labels)
            .map_err(|e| parse_error(file, 1, e.to_string()))?;
    }

    debug!(
        file,
        rows = table.height(),
        columns = table.width(),
        "Table read"
    );
    Ok(table)
}

/// Repeated header names get `.1`, `.2`, ... suffixes in order of appearance.
fn dedupe_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.map(|name| {
        let mut candidate = name.clone();
        let mut n = 0;
        while !seen.insert(candidate.clone()) {
            n += 1;
            candidate = format!("{name}.{n}");
        }
        candidate
    })
    .collect()
}

/// A column is numeric when every present cell parses as a float.
fn infer_column(name: &str, cells: &[&str]) -> Column {
    let numeric = cells
        .iter()
        .all(|c| is_missing(c) || c.parse::<f64>().is_ok());

    if numeric {
        let values = cells
            .iter()
            .map(|c| {
                if is_missing(c) {
                    Value::Missing
                } else {
                    c.parse::<f64>().map_or(Value::Missing, Value::from)
                }
            })
            .collect();
        Column::new(name, ColumnKind::Number, values)
    } else {
        let values = cells
            .iter()
            .map(|c| {
                if is_missing(c) {
                    Value::Missing
                } else {
                    Value::Text(c.to_string())
                }
            })
            .collect();
        Column::new(name, ColumnKind::Text, values)
    }
}

fn date_column(name: &str, cells: &[&str], file: &str) -> DashboardResult<Column> {
    let mut values = Vec::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        if is_missing(cell) {
            values.push(Value::Missing);
            continue;
        }
        match parse_date(cell) {
            Some(date) => values.push(Value::Date(date)),
            // header is line 1
            None => {
                return Err(parse_error(
                    file,
                    row as u64 + 2,
                    format!("invalid date '{cell}' in column '{name}'"),
                ))
            }
        }
    }
    Ok(Column::new(name, ColumnKind::Date, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn read(csv: &str, opts: ReadOptions) -> DashboardResult<Table> {
        read_table(csv.as_bytes(), "test.csv", opts)
    }

    #[test]
    fn test_infers_numeric_and_text_columns() {
        let t = read("channel,revenue\nemail,100\nsearch,\nsocial,2.5\n", ReadOptions::default())
            .unwrap();
        assert_eq!(t.height(), 3);
        assert_eq!(t.column("channel").unwrap().kind, ColumnKind::Text);
        let revenue = t.column("revenue").unwrap();
        assert_eq!(revenue.kind, ColumnKind::Number);
        assert!(revenue.values[1].is_missing());
        assert_eq!(revenue.values[2].as_f64(), Some(2.5));
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        let t = read("spend,spend,spend.1,spend\n1,2,3,4\n", ReadOptions::default()).unwrap();
        assert_eq!(t.column_names(), vec!["spend", "spend.1", "spend.1.1", "spend.2"]);
        assert_eq!(t.value(0, "spend.2").unwrap().as_f64(), Some(4.0));
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let t = read("code\n1\nA7\n", ReadOptions::default()).unwrap();
        let code = t.column("code").unwrap();
        assert_eq!(code.kind, ColumnKind::Text);
        assert_eq!(code.values[0].as_str(), Some("1"));
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let t = read("a,b\n1,\n2,NA\n", ReadOptions::default()).unwrap();
        let b = t.column("b").unwrap();
        assert!(b.is_numeric());
        assert!(b.values.iter().all(Value::is_missing));
    }

    #[test]
    fn test_date_coercion_only_when_enabled() {
        let csv = "date,revenue\n2024-01-15,10\n2024-02-01,20\n";
        let plain = read(csv, ReadOptions::default()).unwrap();
        assert_eq!(plain.column("date").unwrap().kind, ColumnKind::Text);

        let dated = read(
            csv,
            ReadOptions {
                parse_dates: true,
                ..Default::default()
            },
        )
        .unwrap();
        let date = dated.column("date").unwrap();
        assert_eq!(date.kind, ColumnKind::Date);
        assert_eq!(date.values[0].as_date(), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_bad_date_is_parse_error_with_line() {
        let err = read(
            "date,revenue\n2024-01-15,10\nyesterday,20\n",
            ReadOptions {
                parse_dates: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        match err {
            DashboardError::Parse { file, line, message } => {
                assert_eq!(file, "test.csv");
                assert_eq!(line, 3);
                assert!(message.contains("yesterday"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let err = read("a,b\n1,2\n3\n", ReadOptions::default()).unwrap_err();
        assert!(matches!(err, DashboardError::Parse { .. }));
    }

    #[test]
    fn test_header_only_is_parse_error() {
        let err = read("a,b\n", ReadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    #[test]
    fn test_first_column_as_index() {
        let t = read(
            ",spend,revenue\nspend,1.0,0.8\nrevenue,0.8,1.0\n",
            ReadOptions {
                first_column_is_index: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(t.width(), 2);
        assert_eq!(t.column_names(), vec!["spend", "revenue"]);
        assert_eq!(t.index().unwrap(), &["spend".to_string(), "revenue".to_string()]);
        assert_eq!(t.value(0, "revenue").unwrap().as_f64(), Some(0.8));
    }
}
