//! Attribution and funnel page: conversion funnel, per-model channel
//! attribution, metric correlations and a two-model comparison.

use crate::chart::{ChartKind, ChartSpec, PageReport};
use crate::controller::{missing, present, require, PageController};
use crate::funnel::analyze_funnel;
use novamart_analytics::{sort_by, top_n};
use novamart_core::{DashboardError, DashboardResult, Table, TableBundle, TableName};
use serde::Deserialize;

/// Channels shown per donut.
const DONUT_CHANNELS: usize = 8;

/// Unset models default to the first (and second) model column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttributionSelections {
    pub model: Option<String>,
    pub first_model: Option<String>,
    pub second_model: Option<String>,
}

/// Numeric columns other than `channel`, one per attribution model.
pub fn attribution_models(attribution: &Table) -> Vec<&str> {
    attribution
        .columns()
        .iter()
        .filter(|c| c.name != "channel" && c.is_numeric())
        .map(|c| c.name.as_str())
        .collect()
}

#[derive(Default)]
pub struct AttributionFunnel;

impl AttributionFunnel {
    fn funnel(&self, funnel: &Table, report: &mut PageReport) -> DashboardResult<Vec<ChartSpec>> {
        require(funnel, TableName::Funnel, &["stage", "visitors"])?;
        let result = present(analyze_funnel(funnel), TableName::Funnel, "stage")?;
        if let Some(worst) = result.largest_drop_off() {
            report.warning(format!("Largest drop-off: {} stage", worst.stage));
        }

        let table = result.to_table();
        Ok(vec![
            ChartSpec::new(
                "funnel",
                ChartKind::Funnel,
                "Marketing Conversion Funnel",
                table.select(&["stage", "visitors"]),
            )
            .x("visitors")
            .y("stage")
            .option("textinfo", "value+percent"),
            ChartSpec::new(
                "funnel_rates",
                ChartKind::Table,
                "Conversion Rates Between Stages",
                table.select(&["stage", "visitors", "stage_to_next"]),
            ),
        ])
    }

    fn model_bar(&self, attribution: &Table, selected: Option<&str>) -> DashboardResult<Vec<ChartSpec>> {
        require(attribution, TableName::Attribution, &["channel"])?;
        let models = attribution_models(attribution);
        let model = match selected {
            Some(m) if models.contains(&m) => m,
            Some(m) => return Err(missing(TableName::Attribution, m)),
            None => *models
                .first()
                .ok_or_else(|| missing(TableName::Attribution, "model"))?,
        };
        let data = present(
            sort_by(&attribution.select(&["channel", model]), model, true),
            TableName::Attribution,
            model,
        )?;

        Ok(vec![ChartSpec::new(
            "attribution_model",
            ChartKind::Bar,
            format!("Channel Attribution - {model}"),
            data,
        )
        .x(model)
        .y("channel")
        .color(model)
        .text(model)
        .horizontal()
        .option("models", models)])
    }

    fn correlation(&self, correlation: &Table, report: &mut PageReport) -> DashboardResult<Vec<ChartSpec>> {
        if correlation.is_empty() || correlation.width() == 0 {
            return Err(missing(TableName::Correlation, "index"));
        }
        let matrix = correlation
            .to_matrix()
            .ok_or_else(|| DashboardError::Shape("correlation matrix has non-numeric columns".into()))?;
        let n = matrix.ncols();
        if matrix.nrows() != n {
            return Err(DashboardError::Shape(format!(
                "correlation matrix is {}x{n}, expected square",
                matrix.nrows()
            )));
        }

        let strongest = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .filter(|&(i, j)| matrix[[i, j]].is_finite())
            .fold(None, |best: Option<(usize, usize)>, (i, j)| match best {
                Some((bi, bj)) if matrix[[bi, bj]].abs() >= matrix[[i, j]].abs() => best,
                _ => Some((i, j)),
            });
        if let Some((i, j)) = strongest {
            let names = correlation.column_names();
            let row = correlation.index().map_or(names[i], |labels| labels[i].as_str());
            report.info(format!(
                "Strongest correlation: {row} and {} ({:.2})",
                names[j],
                matrix[[i, j]]
            ));
        }

        Ok(vec![ChartSpec::new(
            "correlation_matrix",
            ChartKind::Heatmap,
            "Marketing Metrics Correlation Matrix",
            correlation.clone(),
        )
        .option("zmid", 0)
        .option("text_format", ".2f")])
    }

    fn model_donuts(
        &self,
        attribution: &Table,
        selections: &AttributionSelections,
    ) -> DashboardResult<Vec<ChartSpec>> {
        require(attribution, TableName::Attribution, &["channel"])?;
        let models = attribution_models(attribution);
        if models.len() < 2 {
            return Ok(Vec::new());
        }
        let pick = |chosen: &Option<String>, fallback: &str| -> DashboardResult<String> {
            match chosen {
                Some(m) if models.contains(&m.as_str()) => Ok(m.clone()),
                Some(m) => Err(missing(TableName::Attribution, m)),
                None => Ok(fallback.to_string()),
            }
        };
        let first = pick(&selections.first_model, models[0])?;
        let second = pick(&selections.second_model, models[1])?;

        [("first", first), ("second", second)]
            .into_iter()
            .map(|(slot, model)| {
                let pair = attribution.select(&["channel", model.as_str()]);
                let top = top_n(&pair, &model, DONUT_CHANNELS);
                let data = present(top, TableName::Attribution, &model)?;
                Ok(ChartSpec::new(
                    format!("attribution_donut_{slot}"),
                    ChartKind::Donut,
                    format!("Attribution: {model}"),
                    data,
                )
                .x("channel")
                .y(model.as_str())
                .option("hole", 0.4))
            })
            .collect()
    }
}

impl PageController for AttributionFunnel {
    type Selections = AttributionSelections;

    fn render(&self, bundle: &TableBundle, selections: &AttributionSelections) -> PageReport {
        let attribution = bundle.get(TableName::Attribution);
        let mut report = PageReport::new("attribution-funnel");

        let funnel = self.funnel(bundle.get(TableName::Funnel), &mut report);
        report.section("Funnel", funnel);
        report.section(
            "Attribution",
            self.model_bar(attribution, selections.model.as_deref()),
        );
        let correlation = self.correlation(bundle.get(TableName::Correlation), &mut report);
        report.section("Correlation", correlation);
        report.section("Attribution comparison", self.model_donuts(attribution, selections));
        report
    }
}
