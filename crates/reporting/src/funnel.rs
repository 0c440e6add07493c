//! Funnel analysis: canonical stage ordering and stage-to-stage conversion.

use novamart_core::{Column, ColumnKind, Table, Value};
use serde::Serialize;

/// Stages in funnel order. Anything else sorts after these.
pub const STAGE_ORDER: [&str; 6] = [
    "Awareness",
    "Interest",
    "Consideration",
    "Evaluation",
    "Decision",
    "Purchase",
];

pub fn stage_rank(stage: &str) -> usize {
    STAGE_ORDER
        .iter()
        .position(|s| *s == stage)
        .unwrap_or(STAGE_ORDER.len())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStepResult {
    pub stage: String,
    pub visitors: f64,
    /// Visitors as a percentage of the previous stage; 100 for the first.
    pub stage_to_next: f64,
    /// Visitors as a percentage of the first stage.
    pub overall_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelResult {
    pub steps: Vec<FunnelStepResult>,
}

impl FunnelResult {
    /// The stage after the first with the lowest stage-to-stage rate; first
    /// one on ties. `None` when no stage loses visitors.
    pub fn largest_drop_off(&self) -> Option<&FunnelStepResult> {
        let losing = self.steps.iter().skip(1).filter(|s| s.stage_to_next < 100.0);
        losing.fold(None, |worst, step| match worst {
            Some(w) if w.stage_to_next <= step.stage_to_next => Some(w),
            _ => Some(step),
        })
    }

    pub fn to_table(&self) -> Table {
        let values = |f: fn(&FunnelStepResult) -> f64| -> Vec<Value> {
            self.steps.iter().map(|s| Value::from(f(s))).collect()
        };
        Table::try_new(vec![
            Column::texts("stage", self.steps.iter().map(|s| s.stage.clone())),
            Column::new("visitors", ColumnKind::Number, values(|s| s.visitors)),
            Column::new("stage_to_next", ColumnKind::Number, values(|s| s.stage_to_next)),
            Column::new("overall_rate", ColumnKind::Number, values(|s| s.overall_rate)),
        ])
        .unwrap_or_default()
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole != 0.0 {
        part * 100.0 / whole
    } else {
        0.0
    }
}

/// Order the `stage`/`visitors` rows canonically and compute conversion
/// rates. Rows with a missing stage or visitor count are skipped. `None`
/// when either column is absent.
pub fn analyze_funnel(funnel: &Table) -> Option<FunnelResult> {
    let stages = funnel.column("stage")?;
    let visitors = funnel.column("visitors")?;

    let mut rows: Vec<(String, f64)> = stages
        .values
        .iter()
        .zip(&visitors.values)
        .filter_map(|(s, v)| match (s, v.as_f64()) {
            (Value::Missing, _) | (_, None) => None,
            (s, Some(v)) => Some((s.to_string(), v)),
        })
        .collect();
    rows.sort_by_key(|(stage, _)| stage_rank(stage));

    let first = rows.first().map_or(0.0, |(_, v)| *v);
    let mut previous: Option<f64> = None;
    let steps = rows
        .into_iter()
        .map(|(stage, visitors)| {
            let stage_to_next = previous.map_or(100.0, |p| percent(visitors, p));
            previous = Some(visitors);
            FunnelStepResult {
                stage,
                visitors,
                stage_to_next,
                overall_rate: percent(visitors, first),
            }
        })
        .collect();
    Some(FunnelResult { steps })
}
