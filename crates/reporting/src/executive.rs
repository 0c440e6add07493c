//! Executive overview: headline KPIs, revenue trend, channel comparison.

use crate::chart::{ChartKind, ChartSpec, PageReport};
use crate::controller::{present, require, PageController};
use chrono::{Datelike, Duration, NaiveDate};
use novamart_analytics::{filter_in, group_by, sort_by, Agg, DerivedMetrics};
use novamart_core::{Column, ColumnKind, DashboardResult, Table, TableBundle, TableName, Value};
use serde::Deserialize;

/// Rows counted as "recent" in the revenue KPI.
const RECENT_ROWS: usize = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendAggregation {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TrendAggregation {
    /// Start of the period containing `date`. Weeks start on Monday.
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        match self {
            TrendAggregation::Daily => date,
            TrendAggregation::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            TrendAggregation::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    fn axis_title(&self) -> &'static str {
        match self {
            TrendAggregation::Daily => "Date",
            TrendAggregation::Weekly => "Week Starting",
            TrendAggregation::Monthly => "Month",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMetric {
    #[default]
    Revenue,
    Conversions,
    Roas,
}

impl ChannelMetric {
    fn column(&self) -> &'static str {
        match self {
            ChannelMetric::Revenue => "revenue",
            ChannelMetric::Conversions => "conversions",
            ChannelMetric::Roas => "roas",
        }
    }

    fn agg(&self) -> Agg {
        match self {
            ChannelMetric::Roas => Agg::Mean,
            _ => Agg::Sum,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ChannelMetric::Revenue => "Revenue",
            ChannelMetric::Conversions => "Conversions",
            ChannelMetric::Roas => "ROAS",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExecutiveSelections {
    pub aggregation: TrendAggregation,
    /// Channels to include in the trend; empty means all.
    pub channels: Vec<String>,
    pub metric: ChannelMetric,
}

pub struct ExecutiveOverview<'a> {
    engine: &'a DerivedMetrics,
}

impl<'a> ExecutiveOverview<'a> {
    pub fn new(engine: &'a DerivedMetrics) -> Self {
        Self { engine }
    }

    fn kpis(&self, campaigns: &Table) -> ChartSpec {
        let stats = self.engine.summary(campaigns);
        let revenue = campaigns
            .column("revenue")
            .map(|c| c.as_f64s())
            .unwrap_or_default();
        let recent: f64 = revenue
            .iter()
            .skip(revenue.len().saturating_sub(RECENT_ROWS))
            .flatten()
            .sum();
        let recent_share = if stats.total_revenue != 0.0 {
            recent / stats.total_revenue * 100.0
        } else {
            0.0
        };
        let avg_conversions = campaigns
            .column("conversions")
            .and_then(|c| c.mean())
            .unwrap_or(0.0);

        let data = Table::try_new(vec![
            Column::texts(
                "metric",
                ["Total Revenue", "Total Conversions", "Avg ROAS", "Total Ad Spend", "ROI"],
            ),
            Column::numbers(
                "value",
                [
                    stats.total_revenue,
                    stats.total_conversions,
                    stats.avg_roas,
                    stats.total_spend,
                    stats.net_return(),
                ],
            ),
        ])
        .unwrap_or_default();

        ChartSpec::new("kpis", ChartKind::Kpi, "Key Performance Indicators", data)
            .x("metric")
            .y("value")
            .option("recent_revenue_share", recent_share)
            .option("avg_conversions", avg_conversions)
    }

    fn revenue_trend(
        &self,
        campaigns: &Table,
        selections: &ExecutiveSelections,
    ) -> DashboardResult<Vec<ChartSpec>> {
        require(campaigns, TableName::Campaigns, &["date", "revenue"])?;
        let calendar = self.engine.calendar(campaigns);

        let filtered = if selections.channels.is_empty() {
            (*calendar).clone()
        } else {
            let wanted: Vec<Value> = selections.channels.iter().map(|c| Value::from(c.as_str())).collect();
            filter_in(&calendar, "channel", &wanted)
        };

        let agg = selections.aggregation;
        let periods: Vec<Value> = filtered
            .column("date")
            .map(|c| {
                c.values
                    .iter()
                    .map(|v| v.as_date().map_or(Value::Missing, |d| Value::from(agg.bucket(d))))
                    .collect()
            })
            .unwrap_or_default();
        let bucketed = filtered
            .select(&["revenue"])
            .with_column(Column::new("date", ColumnKind::Date, periods))?;
        let trend = present(
            group_by(&bucketed, &["date"], "revenue", Agg::Sum),
            TableName::Campaigns,
            "revenue",
        )?;

        Ok(vec![ChartSpec::new("revenue_trend", ChartKind::Line, "Revenue Trend", trend)
            .x("date")
            .y("revenue")
            .option("x_title", agg.axis_title())
            .option("markers", true)])
    }

    fn channel_comparison(
        &self,
        campaigns: &Table,
        metric: ChannelMetric,
    ) -> DashboardResult<Vec<ChartSpec>> {
        let column = metric.column();
        require(campaigns, TableName::Campaigns, &["channel", column])?;
        let grouped = present(
            group_by(campaigns, &["channel"], column, metric.agg()),
            TableName::Campaigns,
            column,
        )?;
        let ascending = present(sort_by(&grouped, column, false), TableName::Campaigns, column)?;

        Ok(vec![ChartSpec::new(
            "channel_performance",
            ChartKind::Bar,
            format!("Channel Performance by {}", metric.label()),
            ascending,
        )
        .x(column)
        .y("channel")
        .color(column)
        .text(column)
        .horizontal()])
    }
}

impl PageController for ExecutiveOverview<'_> {
    type Selections = ExecutiveSelections;

    fn render(&self, bundle: &TableBundle, selections: &ExecutiveSelections) -> PageReport {
        let campaigns = bundle.campaigns();
        let mut report = PageReport::new("executive-overview");

        report.push_chart(self.kpis(campaigns));
        report.section("Revenue trend", self.revenue_trend(campaigns, selections));
        report.section("Channel", self.channel_comparison(campaigns, selections.metric));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn render(selections: &ExecutiveSelections) -> PageReport {
        let engine = DerivedMetrics::new(16);
        ExecutiveOverview::new(&engine).render(&fixtures::bundle(), selections)
    }

    #[test]
    fn test_kpis_match_summary() {
        let report = render(&ExecutiveSelections::default());
        let kpis = report.chart("kpis").unwrap();
        let values = kpis.data.column("value").unwrap().present_f64s();
        assert_eq!(values, vec![2100.0, 21.0, 20.0 / 6.0, 630.0, 1470.0]);
        assert_eq!(kpis.options["recent_revenue_share"], 100.0);
        assert!(report.warnings().next().is_none());
    }

    #[test]
    fn test_weekly_trend_starts_on_monday() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 8).unwrap(); // Thursday
        assert_eq!(
            TrendAggregation::Weekly.bucket(d),
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
        let report = render(&ExecutiveSelections {
            aggregation: TrendAggregation::Weekly,
            ..Default::default()
        });
        let trend = &report.chart("revenue_trend").unwrap().data;
        // 2023-01-02 and 2023-01-04 share a week, as do 2024-02-05/06
        assert_eq!(trend.height(), 4);
        assert_eq!(trend.value(3, "revenue").unwrap().as_f64(), Some(1100.0));
    }

    #[test]
    fn test_monthly_trend_with_channel_filter() {
        let report = render(&ExecutiveSelections {
            aggregation: TrendAggregation::Monthly,
            channels: vec!["Email".into()],
            ..Default::default()
        });
        let trend = &report.chart("revenue_trend").unwrap().data;
        let revenue = trend.column("revenue").unwrap().present_f64s();
        assert_eq!(revenue, vec![100.0, 300.0, 600.0]);
        assert_eq!(
            trend.value(0, "date").unwrap().as_date(),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
    }

    #[test]
    fn test_channel_bar_sorted_ascending() {
        let report = render(&ExecutiveSelections {
            metric: ChannelMetric::Roas,
            ..Default::default()
        });
        let bars = &report.chart("channel_performance").unwrap().data;
        let values = bars.column("roas").unwrap().present_f64s();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(bars.value(2, "channel").unwrap().as_str(), Some("Social"));
    }

    #[test]
    fn test_missing_columns_degrade_to_notices() {
        let engine = DerivedMetrics::new(4);
        let bundle = fixtures::bundle_with(TableName::Campaigns, fixtures::unrelated());
        let report = ExecutiveOverview::new(&engine).render(&bundle, &ExecutiveSelections::default());
        assert_eq!(report.charts.len(), 1);
        assert_eq!(report.warnings().count(), 2);
    }
}
