//! Lead-scoring model evaluation: confusion matrix, ROC curve, learning
//! curve and feature importance.

use crate::chart::{ChartKind, ChartSpec, PageReport};
use crate::controller::{missing, present, require, resolve, PageController};
use novamart_analytics::{
    as_label, auc, confusion_matrix, optimal_threshold, predict, roc_curve, sort_by, top_n,
    ClassificationMetrics,
};
use novamart_core::{Column, ColumnAlias, ColumnKind, DashboardResult, Table, TableBundle, TableName, Value};
use serde::Deserialize;
use serde_json::json;

const CLASS_LABELS: [&str; 2] = ["Not Converted", "Converted"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MlSelections {
    /// Probability cut-off, clamped to 0..=1.
    pub threshold: f64,
    pub show_bands: bool,
    pub sort_order: SortOrder,
}

impl Default for MlSelections {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            show_bands: true,
            sort_order: SortOrder::default(),
        }
    }
}

impl MlSelections {
    fn threshold(&self) -> f64 {
        if self.threshold.is_finite() {
            self.threshold.clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

/// Rows where both the actual label and the paired cell are usable.
fn labelled<T>(
    leads: &Table,
    actual: &str,
    column: &str,
    cell: impl Fn(&Value) -> Option<T>,
) -> (Vec<bool>, Vec<T>) {
    let (Some(labels), Some(paired)) = (leads.column(actual), leads.column(column)) else {
        return (Vec::new(), Vec::new());
    };
    labels
        .values
        .iter()
        .zip(&paired.values)
        .filter_map(|(label, value)| Some((as_label(label)?, cell(value)?)))
        .unzip()
}

fn score(value: &Value) -> Option<f64> {
    value.as_f64().filter(|s| !s.is_nan())
}

#[derive(Default)]
pub struct MlEvaluation;

impl MlEvaluation {
    fn confusion(&self, leads: &Table, threshold: f64) -> DashboardResult<Vec<ChartSpec>> {
        let actual_col = resolve(leads, TableName::Leads, ColumnAlias::ActualConverted)?;
        let (actual, predicted) = if leads.has_column("predicted_probability") {
            let (actual, scores) = labelled(leads, actual_col, "predicted_probability", score);
            let predicted = predict(&scores, threshold);
            (actual, predicted)
        } else if leads.has_column("predicted_class") {
            labelled(leads, actual_col, "predicted_class", as_label)
        } else {
            return Err(missing(TableName::Leads, "predicted_probability"));
        };

        let cm = confusion_matrix(&actual, &predicted);
        let metrics = ClassificationMetrics::from_matrix(&cm);
        let columns = CLASS_LABELS
            .iter()
            .enumerate()
            .map(|(p, label)| {
                Column::new(*label, ColumnKind::Number, (0..2).map(|a| Value::from(cm[[a, p]])).collect())
            })
            .collect();
        let data = Table::try_new(columns)?.with_index(CLASS_LABELS.map(String::from).to_vec())?;

        Ok(vec![ChartSpec::new(
            "confusion_matrix",
            ChartKind::Heatmap,
            format!("Confusion Matrix (Threshold: {threshold:.2})"),
            data,
        )
        .x("Predicted")
        .y("Actual")
        .option("threshold", threshold)
        .option("metrics", serde_json::to_value(metrics)?)])
    }

    fn roc(&self, leads: &Table, report: &mut PageReport) -> DashboardResult<Vec<ChartSpec>> {
        let actual_col = resolve(leads, TableName::Leads, ColumnAlias::ActualConverted)?;
        require(leads, TableName::Leads, &["predicted_probability"])?;
        let (actual, scores) = labelled(leads, actual_col, "predicted_probability", score);
        let points = roc_curve(&actual, &scores);
        let optimal = present(optimal_threshold(&points), TableName::Leads, actual_col)?;
        let area = auc(&points);
        report.success(format!("AUC Score: {area:.3}"));

        let data = Table::try_new(vec![
            Column::numbers("fpr", points.iter().map(|p| p.fpr)),
            Column::numbers("tpr", points.iter().map(|p| p.tpr)),
            Column::numbers("threshold", points.iter().map(|p| p.threshold)),
        ])?;
        Ok(vec![ChartSpec::new("roc_curve", ChartKind::Line, "ROC Curve", data)
            .x("fpr")
            .y("tpr")
            .option("auc", area)
            .option("optimal", serde_json::to_value(optimal)?)
            .option("baseline", json!([[0.0, 0.0], [1.0, 1.0]]))])
    }

    fn learning(&self, curve: &Table, show_bands: bool) -> DashboardResult<Vec<ChartSpec>> {
        require(curve, TableName::LearningCurve, &["training_size"])?;
        let series: Vec<&str> = ["training_score", "validation_score"]
            .into_iter()
            .filter(|c| curve.has_column(c))
            .collect();
        let mut keep = vec!["training_size"];
        keep.extend(&series);
        let mut data = curve.select(&keep);

        let band = match (curve.column("training_score"), curve.column("training_std")) {
            (Some(score), Some(std)) if show_bands => {
                let shifted = |sign: f64| -> Vec<Option<f64>> {
                    score
                        .as_f64s()
                        .into_iter()
                        .zip(std.as_f64s())
                        .map(|(s, d)| Some(s? + sign * d?))
                        .collect()
                };
                data.set_column(Column::optional_numbers("training_upper", shifted(1.0)))?;
                data.set_column(Column::optional_numbers("training_lower", shifted(-1.0)))?;
                true
            }
            _ => false,
        };

        let mut chart = ChartSpec::new(
            "learning_curve",
            ChartKind::Line,
            "Learning Curve - Model Diagnostics",
            data,
        )
        .x("training_size")
        .option("series", series)
        .option("markers", true);
        if band {
            chart = chart.option("band", json!(["training_lower", "training_upper"]));
        }
        Ok(vec![chart])
    }

    fn importance(
        &self,
        features: &Table,
        order: SortOrder,
        report: &mut PageReport,
    ) -> DashboardResult<Vec<ChartSpec>> {
        require(features, TableName::FeatureImportance, &["feature", "importance"])?;
        let mut keep = vec!["feature", "importance"];
        let has_std = features.has_column("std");
        if has_std {
            keep.push("std");
        }
        let descending = order == SortOrder::Descending;
        let sorted = present(
            sort_by(&features.select(&keep), "importance", descending),
            TableName::FeatureImportance,
            "importance",
        )?;

        if let Some(top) = top_n(features, "importance", 3) {
            let lines: Vec<String> = (0..top.height())
                .filter_map(|r| {
                    let name = top.value(r, "feature")?;
                    let score = top.value(r, "importance")?.as_f64()?;
                    Some(format!("{}. {name} - {score:.3}", r + 1))
                })
                .collect();
            if !lines.is_empty() {
                report.success(format!("Top 3 Features: {}", lines.join("; ")));
            }
        }

        let mut chart = ChartSpec::new(
            "feature_importance",
            ChartKind::Bar,
            "Feature Importance for Lead Conversion",
            sorted,
        )
        .x("importance")
        .y("feature")
        .color("importance")
        .text("importance")
        .horizontal();
        if has_std {
            chart = chart.option("error_x", "std");
        }
        Ok(vec![chart])
    }
}

impl PageController for MlEvaluation {
    type Selections = MlSelections;

    fn render(&self, bundle: &TableBundle, selections: &MlSelections) -> PageReport {
        let leads = bundle.get(TableName::Leads);
        let mut report = PageReport::new("ml-evaluation");

        report.section("Confusion matrix", self.confusion(leads, selections.threshold()));
        let roc = self.roc(leads, &mut report);
        report.section("ROC curve", roc);
        report.section(
            "Learning curve",
            self.learning(bundle.get(TableName::LearningCurve), selections.show_bands),
        );
        let importance = self.importance(
            bundle.get(TableName::FeatureImportance),
            selections.sort_order,
            &mut report,
        );
        report.section("Feature importance", importance);
        report
    }
}
