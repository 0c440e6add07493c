//! Group-by, sort and filter primitives over tables.
//!
//! These return `None` when a referenced column is absent; callers decide
//! how to surface that.

use novamart_core::{Column, ColumnKind, Table, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agg {
    Sum,
    Mean,
    Count,
}

#[derive(Default)]
struct Acc {
    sum: f64,
    present: usize,
    rows: usize,
}

/// Aggregate `value` over the distinct combinations of `keys`.
///
/// Output has the key columns followed by the aggregated column (named
/// `value`, or `count` for [`Agg::Count`]), one row per group, sorted by
/// key. Rows with a missing key are dropped; missing values are skipped.
pub fn group_by(table: &Table, keys: &[&str], value: &str, agg: Agg) -> Option<Table> {
    let key_cols: Vec<&Column> = keys
        .iter()
        .map(|k| table.column(k))
        .collect::<Option<_>>()?;
    let value_col = table.column(value)?;

    let mut groups: BTreeMap<Vec<Value>, Acc> = BTreeMap::new();
    for row in 0..table.height() {
        let key: Vec<Value> = key_cols.iter().map(|c| c.values[row].clone()).collect();
        if key.iter().any(Value::is_missing) {
            continue;
        }
        let acc = groups.entry(key).or_default();
        acc.rows += 1;
        if let Some(v) = value_col.values[row].as_f64() {
            acc.sum += v;
            acc.present += 1;
        }
    }

    let mut key_values: Vec<Vec<Value>> = vec![Vec::with_capacity(groups.len()); keys.len()];
    let mut agg_values = Vec::with_capacity(groups.len());
    for (key, acc) in groups {
        for (slot, v) in key_values.iter_mut().zip(key) {
            slot.push(v);
        }
        agg_values.push(match agg {
            Agg::Sum => Value::from(acc.sum),
            Agg::Mean if acc.present > 0 => Value::from(acc.sum / acc.present as f64),
            Agg::Mean => Value::Missing,
            Agg::Count => Value::from(acc.rows as f64),
        });
    }

    let mut columns: Vec<Column> = key_cols
        .iter()
        .zip(key_values)
        .map(|(c, values)| Column::new(c.name.clone(), c.kind, values))
        .collect();
    let out_name = if agg == Agg::Count { "count" } else { value };
    columns.push(Column::new(out_name, ColumnKind::Number, agg_values));
    Table::try_new(columns).ok()
}

/// Missing values order last in either direction.
fn compare(a: &Value, b: &Value, descending: bool) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ if descending => b.cmp(a),
        _ => a.cmp(b),
    }
}

/// Stable sort by one column.
pub fn sort_by(table: &Table, column: &str, descending: bool) -> Option<Table> {
    let col = table.column(column)?;
    let mut rows: Vec<usize> = (0..table.height()).collect();
    rows.sort_by(|&a, &b| compare(&col.values[a], &col.values[b], descending));
    Some(table.take_rows(&rows))
}

/// The `n` rows with the largest present values of `column`.
pub fn top_n(table: &Table, column: &str, n: usize) -> Option<Table> {
    let sorted = sort_by(table, column, true)?;
    let present: Vec<usize> = (0..sorted.height())
        .filter(|&r| sorted.value(r, column).is_some_and(|v| !v.is_missing()))
        .take(n)
        .collect();
    Some(sorted.take_rows(&present))
}

/// Rows where `column == value`. Absent column → table unchanged.
pub fn filter_eq(table: &Table, column: &str, value: &Value) -> Table {
    match table.column(column) {
        Some(col) => table.filter_rows(|r| &col.values[r] == value),
        None => table.clone(),
    }
}

/// Rows where `column` is one of `values`. Absent column → table unchanged.
pub fn filter_in(table: &Table, column: &str, values: &[Value]) -> Table {
    match table.column(column) {
        Some(col) => table.filter_rows(|r| values.contains(&col.values[r])),
        None => table.clone(),
    }
}

/// Running total of `value` within each `group`, in row order, stored as
/// column `output`.
pub fn cumulative_sum_by(table: &Table, group: &str, value: &str, output: &str) -> Option<Table> {
    let group_col = table.column(group)?;
    let value_col = table.column(value)?;
    let mut running: HashMap<&Value, f64> = HashMap::new();
    Some(table.with_derived(output, ColumnKind::Number, |r| {
        let total = running.entry(&group_col.values[r]).or_insert(0.0);
        if let Some(v) = value_col.values[r].as_f64() {
            *total += v;
        }
        Value::from(*total)
    }))
}

/// Share of each row's `value` within its `group` total, in percent.
pub fn percent_of_group(table: &Table, group: &str, value: &str, output: &str) -> Option<Table> {
    let totals = group_by(table, &[group], value, Agg::Sum)?;
    let lookup: HashMap<&Value, f64> = (0..totals.height())
        .filter_map(|r| {
            let key = totals.value(r, group)?;
            let total = totals.value(r, value)?.as_f64()?;
            Some((key, total))
        })
        .collect();
    let group_col = table.column(group)?;
    let value_col = table.column(value)?;
    Some(table.with_derived(output, ColumnKind::Number, |r| {
        let total = lookup.get(&group_col.values[r]).copied().unwrap_or(0.0);
        match value_col.values[r].as_f64() {
            Some(v) if total != 0.0 => Value::from(v / total * 100.0),
            _ => Value::Missing,
        }
    }))
}
