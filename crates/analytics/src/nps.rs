//! Net Promoter Score bucketing.

use novamart_core::{ColumnKind, Table, Value};

pub const NPS_CATEGORIES: [&str; 3] = ["Detractor", "Passive", "Promoter"];

/// Right-closed bins: `(edges[0], edges[1]]`, `(edges[1], edges[2]]`, ...
fn bucket(score: f64, edges: [f64; 4]) -> Option<&'static str> {
    (0..3)
        .find(|&i| score > edges[i] && score <= edges[i + 1])
        .map(|i| NPS_CATEGORIES[i])
}

/// Add an `nps_category` column unless one already exists.
///
/// Uses `nps` with bins (0,6], (6,8], (8,10] when present, otherwise
/// `satisfaction` with bins (0,3], (3,6], (6,10]. Scores outside the bins
/// are missing. Tables with neither column are returned unchanged.
pub fn with_nps_category(table: &Table) -> Table {
    if table.has_column("nps_category") {
        return table.clone();
    }
    let (source, edges) = if let Some(col) = table.column("nps") {
        (col, [0.0, 6.0, 8.0, 10.0])
    } else if let Some(col) = table.column("satisfaction") {
        (col, [0.0, 3.0, 6.0, 10.0])
    } else {
        return table.clone();
    };

    table.with_derived("nps_category", ColumnKind::Text, |r| {
        source.values[r]
            .as_f64()
            .and_then(|score| bucket(score, edges))
            .map_or(Value::Missing, Value::from)
    })
}
