//! Column-oriented, immutable-by-convention tables.
//!
//! A `Table` is an ordered list of equally long columns plus an optional
//! row-label index. Derived views clone and extend a table rather than
//! mutating the one held in the bundle.

use crate::error::{DashboardError, DashboardResult};
use crate::value::{ColumnKind, Value};
use ndarray::Array2;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn numbers(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            name,
            ColumnKind::Number,
            values.into_iter().map(Value::from).collect(),
        )
    }

    /// Numeric column where `None` marks a missing cell.
    pub fn optional_numbers(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<f64>>,
    ) -> Self {
        Self::new(
            name,
            ColumnKind::Number,
            values.into_iter().map(Value::from).collect(),
        )
    }

    pub fn texts<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            ColumnKind::Text,
            values.into_iter().map(|s| Value::Text(s.into())).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Number
    }

    /// Cells as optional floats; non-numeric or missing cells are `None`.
    pub fn as_f64s(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Non-missing numeric cells only.
    pub fn present_f64s(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    pub fn sum(&self) -> f64 {
        self.present_f64s().iter().sum()
    }

    /// Mean of the non-missing cells, `None` when there are none.
    pub fn mean(&self) -> Option<f64> {
        let present = self.present_f64s();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    index: Option<Vec<String>>,
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, rejecting ragged or duplicated columns.
    pub fn try_new(columns: Vec<Column>) -> DashboardResult<Self> {
        if let Some(first) = columns.first() {
            let height = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != height) {
                return Err(DashboardError::Shape(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    height
                )));
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(DashboardError::Shape(format!(
                    "duplicate column '{}'",
                    col.name
                )));
            }
        }
        Ok(Self {
            index: None,
            columns,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach row labels. The label count must equal the row count.
    pub fn with_index(mut self, labels: Vec<String>) -> DashboardResult<Self> {
        if !self.columns.is_empty() && labels.len() != self.height() {
            return Err(DashboardError::Shape(format!(
                "index has {} labels for {} rows",
                labels.len(),
                self.height()
            )));
        }
        self.index = Some(labels);
        Ok(self)
    }

    pub fn index(&self) -> Option<&[String]> {
        self.index.as_deref()
    }

    pub fn height(&self) -> usize {
        match (&self.index, self.columns.first()) {
            (_, Some(col)) => col.len(),
            (Some(labels), None) => labels.len(),
            (None, None) => 0,
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    fn replace_or_push(&mut self, column: Column) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Replace a column of the same name in place, or append it. Fails with
    /// `Shape` when the column length differs from the table height (a table
    /// without columns accepts any length).
    pub fn set_column(&mut self, column: Column) -> DashboardResult<()> {
        if !self.columns.is_empty() && column.len() != self.height() {
            return Err(DashboardError::Shape(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.height()
            )));
        }
        self.replace_or_push(column);
        Ok(())
    }

    /// Copy of the table with `column` set (see [`Table::set_column`]).
    pub fn with_column(&self, column: Column) -> DashboardResult<Table> {
        let mut out = self.clone();
        out.set_column(column)?;
        Ok(out)
    }

    /// Set column `name` to `cell(row)` for every row. The new column always
    /// has the table's height.
    pub fn set_derived(
        &mut self,
        name: impl Into<String>,
        kind: ColumnKind,
        cell: impl FnMut(usize) -> Value,
    ) {
        let values = (0..self.height()).map(cell).collect();
        self.replace_or_push(Column::new(name, kind, values));
    }

    /// Copy of the table with a derived column (see [`Table::set_derived`]).
    pub fn with_derived(
        &self,
        name: impl Into<String>,
        kind: ColumnKind,
        cell: impl FnMut(usize) -> Value,
    ) -> Table {
        let mut out = self.clone();
        out.set_derived(name, kind, cell);
        out
    }

    /// New table containing the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: rows.iter().map(|&r| c.values[r].clone()).collect(),
            })
            .collect();
        Table {
            index: self
                .index
                .as_ref()
                .map(|labels| rows.iter().map(|&r| labels[r].clone()).collect()),
            columns,
        }
    }

    /// Rows for which `keep` returns true.
    pub fn filter_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Table {
        let rows: Vec<usize> = (0..self.height()).filter(|&r| keep(r)).collect();
        self.take_rows(&rows)
    }

    /// Projection onto the named columns; unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> Table {
        Table {
            index: self.index.clone(),
            columns: names
                .iter()
                .filter_map(|n| self.column(n).cloned())
                .collect(),
        }
    }

    /// Content hash, used as a memoization key for derived views.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.index.hash(&mut hasher);
        for col in &self.columns {
            col.name.hash(&mut hasher);
            col.kind.hash(&mut hasher);
            col.values.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Numeric columns as a dense matrix (rows × columns), missing as NaN.
    /// `None` when any column is non-numeric.
    pub fn to_matrix(&self) -> Option<Array2<f64>> {
        if self.columns.iter().any(|c| !c.is_numeric()) {
            return None;
        }
        let (rows, cols) = (self.height(), self.width());
        Some(Array2::from_shape_fn((rows, cols), |(r, c)| {
            self.columns[c].values[r].as_f64().unwrap_or(f64::NAN)
        }))
    }
}

struct RowsView<'a>(&'a Table);

impl Serialize for RowsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let table = self.0;
        let mut seq = serializer.serialize_seq(Some(table.height()))?;
        for r in 0..table.height() {
            let row: Vec<&Value> = table.columns.iter().map(|c| &c.values[r]).collect();
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.index.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("Table", fields)?;
        state.serialize_field("columns", &self.column_names())?;
        if let Some(index) = &self.index {
            state.serialize_field("index", index)?;
        }
        state.serialize_field("rows", &RowsView(self))?;
        state.end()
    }
}
