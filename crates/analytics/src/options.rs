//! Distinct-value option lists for filter widgets.

use crate::calendar::with_calendar_fields;
use novamart_core::{Table, Value};
use std::collections::BTreeSet;

/// Sorted unique present values of `column`; empty when the column is absent.
pub fn distinct_values(table: &Table, column: &str) -> Vec<Value> {
    let Some(col) = table.column(column) else {
        return Vec::new();
    };
    col.values
        .iter()
        .filter(|v| !v.is_missing())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn channel_options(campaigns: &Table) -> Vec<Value> {
    distinct_values(campaigns, "channel")
}

pub fn region_options(campaigns: &Table) -> Vec<Value> {
    distinct_values(campaigns, "region")
}

pub fn year_options(campaigns: &Table) -> Vec<Value> {
    distinct_values(&with_calendar_fields(campaigns), "year")
}

#[cfg(test)]
mod tests {
    use super::*;
    use novamart_core::{Column, ColumnKind};

    #[test]
    fn test_strictly_sorted_without_duplicates() {
        let t = Table::try_new(vec![Column::texts(
            "channel",
            ["Social", "Email", "Search", "Email", "Social"],
        )])
        .unwrap();
        let options = channel_options(&t);
        assert_eq!(
            options,
            vec![Value::from("Email"), Value::from("Search"), Value::from("Social")]
        );
        assert!(options.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_absent_column_is_empty() {
        let t = Table::try_new(vec![Column::numbers("revenue", [1.0])]).unwrap();
        assert!(channel_options(&t).is_empty());
        assert!(year_options(&t).is_empty());
    }

    #[test]
    fn test_missing_values_excluded() {
        let t = Table::try_new(vec![Column::new(
            "region",
            ColumnKind::Text,
            vec![Value::Missing, Value::from("North")],
        )])
        .unwrap();
        assert_eq!(region_options(&t), vec![Value::from("North")]);
    }

    #[test]
    fn test_year_options_from_dates() {
        let t = Table::try_new(vec![Column::texts(
            "date",
            ["2023-06-01", "2024-01-01", "2023-02-02"],
        )])
        .unwrap();
        assert_eq!(year_options(&t), vec![Value::from(2023.0), Value::from(2024.0)]);
    }
}
