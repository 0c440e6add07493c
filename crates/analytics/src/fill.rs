use novamart_core::{ColumnKind, Table, Value};

/// Replace missing cells of every numeric column with that column's mean.
///
/// Non-numeric columns are untouched. A numeric column with no present
/// values has no mean and stays entirely missing.
pub fn fill_missing_numeric(table: &Table) -> Table {
    let mut out = table.clone();
    for col in table.columns().iter().filter(|c| c.is_numeric()) {
        let Some(mean) = col.mean() else { continue };
        if !col.values.iter().any(Value::is_missing) {
            continue;
        }
        out.set_derived(col.name.clone(), ColumnKind::Number, |r| match &col.values[r] {
            v if v.as_f64().is_some() => v.clone(),
            _ => Value::Number(mean),
        });
    }
    out
}
