//! Calendar fields derived from a `date` column.

use chrono::{Datelike, NaiveDate};
use novamart_core::{parse_date, ColumnKind, Table, Value};

/// Columns added by [`with_calendar_fields`].
pub const CALENDAR_COLUMNS: [&str; 6] = ["year", "month", "quarter", "week", "dayofweek", "month_name"];

fn to_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Text(s) => parse_date(s),
        _ => None,
    }
}

pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Add `year`, `month`, `quarter`, ISO `week`, `dayofweek` and `month_name`.
///
/// A text `date` column is converted to dates first; cells that do not parse
/// get missing calendar fields. Tables without `date` are returned as-is.
/// Applying this twice yields the same table as applying it once.
pub fn with_calendar_fields(table: &Table) -> Table {
    let Some(date_col) = table.column("date") else {
        return table.clone();
    };
    let dates: Vec<Option<NaiveDate>> = date_col.values.iter().map(to_date).collect();

    let mut out = table.clone();
    let mut derive = |name: &str, kind: ColumnKind, field: &dyn Fn(NaiveDate) -> Value| {
        out.set_derived(name, kind, |r| dates[r].map_or(Value::Missing, field));
    };
    if date_col.kind != ColumnKind::Date {
        derive("date", ColumnKind::Date, &Value::Date);
    }
    derive("year", ColumnKind::Number, &|d| Value::from(f64::from(d.year())));
    derive("month", ColumnKind::Number, &|d| Value::from(f64::from(d.month())));
    derive("quarter", ColumnKind::Number, &|d| Value::from(f64::from(quarter_of(d))));
    derive("week", ColumnKind::Number, &|d| Value::from(f64::from(d.iso_week().week())));
    derive("dayofweek", ColumnKind::Text, &|d| Value::Text(d.format("%A").to_string()));
    derive("month_name", ColumnKind::Text, &|d| Value::Text(d.format("%B").to_string()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use novamart_core::Column;

    fn campaigns() -> Table {
        let dates = ["2024-01-01", "2024-05-17", "2024-12-30"]
            .iter()
            .map(|s| Value::Date(parse_date(s).unwrap()))
            .collect();
        Table::try_new(vec![
            Column::new("date", ColumnKind::Date, dates),
            Column::numbers("revenue", [1.0, 2.0, 3.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_adds_calendar_columns() {
        let t = with_calendar_fields(&campaigns());
        for name in CALENDAR_COLUMNS {
            assert!(t.has_column(name), "missing {name}");
        }
        assert_eq!(t.value(1, "year").unwrap().as_f64(), Some(2024.0));
        assert_eq!(t.value(1, "month").unwrap().as_f64(), Some(5.0));
        assert_eq!(t.value(1, "quarter").unwrap().as_f64(), Some(2.0));
        assert_eq!(t.value(1, "dayofweek").unwrap().as_str(), Some("Friday"));
        assert_eq!(t.value(1, "month_name").unwrap().as_str(), Some("May"));
        assert_eq!(t.value(0, "dayofweek").unwrap().as_str(), Some("Monday"));
    }

    #[test]
    fn test_iso_week_crosses_year_boundary() {
        let t = with_calendar_fields(&campaigns());
        // 2024-12-30 is in ISO week 1 of 2025
        assert_eq!(t.value(2, "week").unwrap().as_f64(), Some(1.0));
        assert_eq!(t.value(2, "year").unwrap().as_f64(), Some(2024.0));
        assert_eq!(t.value(2, "quarter").unwrap().as_f64(), Some(4.0));
    }

    #[test]
    fn test_idempotent() {
        let once = with_calendar_fields(&campaigns());
        let twice = with_calendar_fields(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_date_column_passthrough() {
        let t = Table::try_new(vec![Column::numbers("revenue", [1.0])]).unwrap();
        assert_eq!(with_calendar_fields(&t), t);
    }

    #[test]
    fn test_text_dates_are_converted() {
        let t = Table::try_new(vec![Column::texts("date", ["2024-02-29", "soon"])]).unwrap();
        let out = with_calendar_fields(&t);
        assert_eq!(out.column("date").unwrap().kind, ColumnKind::Date);
        assert_eq!(out.value(0, "month").unwrap().as_f64(), Some(2.0));
        assert!(out.value(1, "month").unwrap().is_missing());
        assert_eq!(with_calendar_fields(&out), out);
    }
}
