//! Customer insights: age, lifetime value, satisfaction and segmentation.

use crate::chart::{ChartKind, ChartSpec, PageReport};
use crate::controller::{present, require, resolve, PageController};
use novamart_analytics::{distinct_values, filter_eq, group_by, ols_fit, sort_by, Agg, DerivedMetrics, LinearFit};
use novamart_core::{ColumnAlias, DashboardResult, Table, TableBundle, TableName};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CustomerSelections {
    /// Histogram bin width in years, clamped to 1..=10.
    pub bin_width: u32,
    pub by_segment: bool,
    pub show_points: bool,
    pub split_by_channel: bool,
    pub show_trend: bool,
}

impl Default for CustomerSelections {
    fn default() -> Self {
        Self {
            bin_width: 5,
            by_segment: false,
            show_points: false,
            split_by_channel: false,
            show_trend: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct Trendline {
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(flatten)]
    fit: LinearFit,
}

pub struct CustomerInsights<'a> {
    engine: &'a DerivedMetrics,
}

impl<'a> CustomerInsights<'a> {
    pub fn new(engine: &'a DerivedMetrics) -> Self {
        Self { engine }
    }

    fn age_histogram(&self, customers: &Table, selections: &CustomerSelections) -> DashboardResult<Vec<ChartSpec>> {
        require(customers, TableName::Customers, &["age"])?;
        let width = selections.bin_width.clamp(1, 10);
        let max_age = customers
            .column("age")
            .map(|c| c.present_f64s().into_iter().fold(0.0, f64::max))
            .unwrap_or(0.0);
        let nbins = (max_age / f64::from(width)).floor().max(1.0) as u64;

        let segment = (selections.by_segment && customers.has_column("segment")).then_some("segment");
        let (title, data) = match segment {
            Some(s) => ("Customer Age Distribution by Segment", customers.select(&["age", s])),
            None => ("Customer Age Distribution", customers.select(&["age"])),
        };
        Ok(vec![ChartSpec::new("age_distribution", ChartKind::Histogram, title, data)
            .x("age")
            .color_opt(segment)
            .option("nbins", nbins)
            .option("bin_width", width)
            .option("barmode", "overlay")])
    }

    fn ltv_by_segment(&self, customers: &Table, show_points: bool) -> DashboardResult<Vec<ChartSpec>> {
        let ltv = resolve(customers, TableName::Customers, ColumnAlias::LifetimeValue)?;
        require(customers, TableName::Customers, &["segment"])?;
        let data = present(
            sort_by(&customers.select(&["segment", ltv]), "segment", false),
            TableName::Customers,
            "segment",
        )?;

        let points = if show_points { serde_json::json!("all") } else { serde_json::json!(false) };
        Ok(vec![ChartSpec::new(
            "ltv_by_segment",
            ChartKind::Box,
            "Lifetime Value Distribution by Segment",
            data,
        )
        .x("segment")
        .y(ltv)
        .option("boxmean", "sd")
        .option("points", points)])
    }

    fn satisfaction_by_nps(&self, customers: &Table, split: bool) -> DashboardResult<Vec<ChartSpec>> {
        let score = resolve(customers, TableName::Customers, ColumnAlias::Satisfaction)?;
        require(customers, TableName::Customers, &["nps_category"])?;

        let channel = (split && customers.has_column("channel")).then_some("channel");
        let (title, data) = match channel {
            Some(c) => (
                "Satisfaction Distribution by NPS Category and Channel",
                customers.select(&["nps_category", score, c]),
            ),
            None => (
                "Satisfaction Distribution by NPS Category",
                customers.select(&["nps_category", score]),
            ),
        };
        Ok(vec![ChartSpec::new("satisfaction_by_nps", ChartKind::Violin, title, data)
            .x("nps_category")
            .y(score)
            .color_opt(channel)
            .option("box", true)])
    }

    fn income_vs_ltv(&self, customers: &Table, show_trend: bool, report: &mut PageReport) -> DashboardResult<Vec<ChartSpec>> {
        let ltv = resolve(customers, TableName::Customers, ColumnAlias::LifetimeValue)?;
        let income = resolve(customers, TableName::Customers, ColumnAlias::Income)?;

        let segment = customers.has_column("segment").then_some("segment");
        let mut columns = vec![income, ltv];
        columns.extend(segment);
        let data = customers.select(&columns);

        if let Some(s) = segment {
            let count = distinct_values(customers, s).len();
            report.info(format!("{count} customer segments identified"));
        }

        let title = match segment {
            Some(_) => "Income vs. Lifetime Value by Segment",
            None => "Income vs. Lifetime Value",
        };
        let mut chart = ChartSpec::new("income_vs_ltv", ChartKind::Scatter, title, data.clone())
            .x(income)
            .y(ltv)
            .color_opt(segment);

        if show_trend {
            let groups: Vec<(Option<String>, Table)> = match segment {
                Some(s) => distinct_values(&data, s)
                    .into_iter()
                    .map(|g| (Some(g.to_string()), filter_eq(&data, s, &g)))
                    .collect(),
                None => vec![(None, data)],
            };
            let trendlines: Vec<Trendline> = groups
                .into_iter()
                .filter_map(|(group, rows)| {
                    let xs = rows.column(income)?.as_f64s();
                    let ys = rows.column(ltv)?.as_f64s();
                    let (xs, ys): (Vec<f64>, Vec<f64>) = xs
                        .into_iter()
                        .zip(ys)
                        .filter_map(|(x, y)| Some((x?, y?)))
                        .unzip();
                    let fit = ols_fit(&xs, &ys)?;
                    Some(Trendline { group, fit })
                })
                .collect();
            chart = chart.option("trendlines", serde_json::to_value(trendlines)?);
        }
        Ok(vec![chart])
    }

    fn segment_hierarchy(&self, customers: &Table) -> DashboardResult<Vec<ChartSpec>> {
        require(customers, TableName::Customers, &["segment"])?;
        if customers.has_column("region") {
            let counts = present(
                group_by(customers, &["region", "segment"], "segment", Agg::Count),
                TableName::Customers,
                "segment",
            )?;
            return Ok(vec![ChartSpec::new(
                "segment_hierarchy",
                ChartKind::Sunburst,
                "Customer Segmentation Hierarchy",
                counts,
            )
            .y("count")
            .option("path", serde_json::json!(["region", "segment"]))]);
        }

        let counts = group_by(customers, &["segment"], "segment", Agg::Count)
            .and_then(|t| sort_by(&t, "count", true));
        let counts = present(counts, TableName::Customers, "segment")?;
        Ok(vec![ChartSpec::new(
            "segment_hierarchy",
            ChartKind::Pie,
            "Customer Distribution by Segment",
            counts,
        )
        .x("segment")
        .y("count")])
    }
}

impl PageController for CustomerInsights<'_> {
    type Selections = CustomerSelections;

    fn render(&self, bundle: &TableBundle, selections: &CustomerSelections) -> PageReport {
        let customers = self.engine.customers(bundle.customers());
        let mut report = PageReport::new("customer-insights");

        report.section("Age", self.age_histogram(&customers, selections));
        report.section("Lifetime value", self.ltv_by_segment(&customers, selections.show_points));
        report.section(
            "Satisfaction",
            self.satisfaction_by_nps(&customers, selections.split_by_channel),
        );
        let scatter = self.income_vs_ltv(&customers, selections.show_trend, &mut report);
        report.section("Income and lifetime value", scatter);
        report.section("Segment", self.segment_hierarchy(&customers));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use novamart_core::Column;

    fn render_with(bundle: &TableBundle, selections: &CustomerSelections) -> PageReport {
        let engine = DerivedMetrics::new(16);
        CustomerInsights::new(&engine).render(bundle, selections)
    }

    #[test]
    fn test_full_page_renders_five_charts() {
        let report = render_with(&fixtures::bundle(), &CustomerSelections::default());
        assert_eq!(report.charts.len(), 5);
        assert!(report.warnings().next().is_none());
        assert!(report.notices.iter().any(|n| n.message == "3 customer segments identified"));
    }

    #[test]
    fn test_histogram_bins_follow_width() {
        let report = render_with(
            &fixtures::bundle(),
            &CustomerSelections {
                bin_width: 50,
                by_segment: true,
                ..Default::default()
            },
        );
        let hist = report.chart("age_distribution").unwrap();
        // width clamped to 10, max age 52
        assert_eq!(hist.options["bin_width"], 10);
        assert_eq!(hist.options["nbins"], 5);
        assert_eq!(hist.encoding.color.as_deref(), Some("segment"));
    }

    #[test]
    fn test_ltv_filled_before_plotting() {
        let report = render_with(&fixtures::bundle(), &CustomerSelections::default());
        let ltv = report.chart("ltv_by_segment").unwrap();
        assert!(ltv.data.column("lifetime_value").unwrap().values.iter().all(|v| !v.is_missing()));
        assert_eq!(ltv.data.value(0, "segment").unwrap().as_str(), Some("Budget"));
    }

    #[test]
    fn test_trendline_per_segment() {
        let report = render_with(&fixtures::bundle(), &CustomerSelections::default());
        let scatter = report.chart("income_vs_ltv").unwrap();
        let lines = scatter.options["trendlines"].as_array().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["group"], "Budget");
        assert!(lines[0]["slope"].is_number());
    }

    #[test]
    fn test_pie_when_region_absent() {
        let customers = Table::try_new(vec![Column::texts("segment", ["A", "B", "B"])]).unwrap();
        let bundle = fixtures::bundle_with(TableName::Customers, customers);
        let report = render_with(&bundle, &CustomerSelections::default());
        let pie = report.chart("segment_hierarchy").unwrap();
        assert_eq!(pie.kind, ChartKind::Pie);
        assert_eq!(pie.data.value(0, "segment").unwrap().as_str(), Some("B"));
        assert_eq!(pie.data.value(0, "count").unwrap().as_f64(), Some(2.0));
        assert_eq!(report.warnings().count(), 4);
    }

    #[test]
    fn test_sunburst_counts() {
        let report = render_with(&fixtures::bundle(), &CustomerSelections::default());
        let sunburst = report.chart("segment_hierarchy").unwrap();
        assert_eq!(sunburst.kind, ChartKind::Sunburst);
        let total: f64 = sunburst.data.column("count").unwrap().sum();
        assert_eq!(total, 6.0);
    }
}
