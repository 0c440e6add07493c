//! Campaign analytics: regional quarters, campaign-type mix, cumulative
//! conversions and a month × week heatmap.

use crate::chart::{ChartKind, ChartSpec, PageReport};
use crate::controller::{missing, present, require, resolve, PageController};
use chrono::Datelike;
use novamart_analytics::{
    cumulative_sum_by, filter_eq, group_by, percent_of_group, sort_by, top_n, Agg, DerivedMetrics,
};
use novamart_core::{
    Column, ColumnAlias, ColumnKind, DashboardResult, Table, TableBundle, TableName, Value,
};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackView {
    #[default]
    Absolute,
    Percent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapMetric {
    #[default]
    Revenue,
    Conversions,
    Spend,
}

impl HeatmapMetric {
    fn column(&self) -> &'static str {
        match self {
            HeatmapMetric::Revenue => "revenue",
            HeatmapMetric::Conversions => "conversions",
            HeatmapMetric::Spend => "spend",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            HeatmapMetric::Revenue => "Revenue",
            HeatmapMetric::Conversions => "Conversions",
            HeatmapMetric::Spend => "Spend",
        }
    }
}

/// Years default to the earliest year in the data; a region of `None` or
/// `"All"` means no region filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CampaignSelections {
    pub year: Option<i32>,
    pub view: StackView,
    pub region: Option<String>,
    pub heatmap_year: Option<i32>,
    pub heatmap_metric: HeatmapMetric,
}

pub struct CampaignAnalytics<'a> {
    engine: &'a DerivedMetrics,
}

impl<'a> CampaignAnalytics<'a> {
    pub fn new(engine: &'a DerivedMetrics) -> Self {
        Self { engine }
    }

    fn pick_year(&self, campaigns: &Table, selected: Option<i32>) -> DashboardResult<i32> {
        if let Some(year) = selected {
            return Ok(year);
        }
        self.engine
            .year_options(campaigns)
            .first()
            .and_then(Value::as_f64)
            .map(|y| y as i32)
            .ok_or_else(|| missing(TableName::Campaigns, "year"))
    }

    fn regional_quarters(
        &self,
        campaigns: &Table,
        selected: Option<i32>,
        report: &mut PageReport,
    ) -> DashboardResult<Vec<ChartSpec>> {
        let calendar = self.engine.calendar(campaigns);
        require(&calendar, TableName::Campaigns, &["year", "quarter", "region", "revenue"])?;
        let year = self.pick_year(campaigns, selected)?;

        let in_year = filter_eq(&calendar, "year", &Value::from(f64::from(year)));
        let regional = present(
            group_by(&in_year, &["quarter", "region"], "revenue", Agg::Sum),
            TableName::Campaigns,
            "revenue",
        )?;

        let by_region = group_by(&regional, &["region"], "revenue", Agg::Sum);
        if let Some(top) = by_region.and_then(|t| top_n(&t, "revenue", 1)) {
            if let Some(region) = top.value(0, "region") {
                report.success(format!("{region} region showed the strongest performance in {year}"));
            }
        }

        Ok(vec![ChartSpec::new(
            "regional_quarters",
            ChartKind::GroupedBar,
            format!("Regional Revenue by Quarter ({year})"),
            regional,
        )
        .x("quarter")
        .y("revenue")
        .color("region")])
    }

    fn campaign_type_mix(&self, campaigns: &Table, view: StackView) -> DashboardResult<Vec<ChartSpec>> {
        let type_col = resolve(campaigns, TableName::Campaigns, ColumnAlias::CampaignType)?;
        require(campaigns, TableName::Campaigns, &["date", "spend"])?;
        let calendar = self.engine.calendar(campaigns);

        let months: Vec<Value> = calendar
            .column("date")
            .map(|c| {
                c.values
                    .iter()
                    .map(|v| {
                        v.as_date()
                            .and_then(|d| d.with_day(1))
                            .map_or(Value::Missing, Value::from)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let monthly = calendar
            .select(&[type_col, "spend"])
            .with_column(Column::new("period", ColumnKind::Date, months))?;
        let mix = present(
            group_by(&monthly, &["period", type_col], "spend", Agg::Sum),
            TableName::Campaigns,
            "spend",
        )?;

        let chart = match view {
            StackView::Absolute => ChartSpec::new(
                "campaign_type_mix",
                ChartKind::StackedBar,
                "Campaign Type Contribution (Absolute)",
                mix,
            )
            .y("spend"),
            StackView::Percent => {
                let shares = present(
                    percent_of_group(&mix, "period", "spend", "percentage"),
                    TableName::Campaigns,
                    "spend",
                )?;
                ChartSpec::new(
                    "campaign_type_mix",
                    ChartKind::StackedBar,
                    "Campaign Type Contribution (100% Stacked)",
                    shares,
                )
                .y("percentage")
            }
        };
        Ok(vec![chart.x("period").color(type_col)])
    }

    fn cumulative_conversions(
        &self,
        campaigns: &Table,
        region: Option<&str>,
    ) -> DashboardResult<Vec<ChartSpec>> {
        require(campaigns, TableName::Campaigns, &["channel", "date", "conversions"])?;
        let calendar = self.engine.calendar(campaigns);

        let scoped = match region {
            Some(r) => filter_eq(&calendar, "region", &Value::from(r)),
            None => (*calendar).clone(),
        };
        let ordered = present(sort_by(&scoped, "date", false), TableName::Campaigns, "date")?;
        let cumulative = present(
            cumulative_sum_by(&ordered, "channel", "conversions", "cumulative_conversions"),
            TableName::Campaigns,
            "conversions",
        )?;

        let title = match region {
            Some(r) => format!("Cumulative Conversions by Channel - {r}"),
            None => "Cumulative Conversions by Channel".to_string(),
        };
        Ok(vec![ChartSpec::new(
            "cumulative_conversions",
            ChartKind::Area,
            title,
            cumulative.select(&["date", "channel", "cumulative_conversions"]),
        )
        .x("date")
        .y("cumulative_conversions")
        .color("channel")])
    }

    fn calendar_heatmap(
        &self,
        campaigns: &Table,
        selected: Option<i32>,
        metric: HeatmapMetric,
    ) -> DashboardResult<Vec<ChartSpec>> {
        let column = metric.column();
        let calendar = self.engine.calendar(campaigns);
        require(&calendar, TableName::Campaigns, &["year", "month", "week", column])?;
        let year = self.pick_year(campaigns, selected)?;
        let in_year = filter_eq(&calendar, "year", &Value::from(f64::from(year)));

        let pivot = month_week_pivot(&in_year, column);
        Ok(vec![ChartSpec::new(
            "calendar_heatmap",
            ChartKind::Heatmap,
            format!("Daily {} Heatmap - {year}", metric.label()),
            pivot,
        )
        .option("x_title", "Week Number")
        .option("y_title", "Month")])
    }
}

/// Sum of `value` per (month, ISO week). Rows are months present in the
/// data, labelled `Jan`..`Dec`; columns are the weeks present.
fn month_week_pivot(table: &Table, value: &str) -> Table {
    let mut cells: BTreeMap<(u32, u32), f64> = BTreeMap::new();
    for row in 0..table.height() {
        let month = table.value(row, "month").and_then(Value::as_f64);
        let week = table.value(row, "week").and_then(Value::as_f64);
        let (Some(month), Some(week)) = (month, week) else {
            continue;
        };
        let amount = table.value(row, value).and_then(Value::as_f64).unwrap_or(0.0);
        *cells.entry((month as u32, week as u32)).or_insert(0.0) += amount;
    }

    let months: BTreeSet<u32> = cells.keys().map(|(m, _)| *m).collect();
    let weeks: BTreeSet<u32> = cells.keys().map(|(_, w)| *w).collect();
    let columns = weeks
        .iter()
        .map(|&w| {
            let values = months
                .iter()
                .map(|&m| cells.get(&(m, w)).copied().map_or(Value::Missing, Value::from))
                .collect();
            Column::new(w.to_string(), ColumnKind::Number, values)
        })
        .collect();
    let labels = months
        .iter()
        .map(|&m| MONTH_ABBREVIATIONS[(m as usize).saturating_sub(1) % 12].to_string())
        .collect();

    Table::try_new(columns)
        .and_then(|t| t.with_index(labels))
        .unwrap_or_default()
}

impl PageController for CampaignAnalytics<'_> {
    type Selections = CampaignSelections;

    fn render(&self, bundle: &TableBundle, selections: &CampaignSelections) -> PageReport {
        let campaigns = bundle.campaigns();
        let mut report = PageReport::new("campaign-analytics");

        let regional = self.regional_quarters(campaigns, selections.year, &mut report);
        report.section("Regional quarterly", regional);
        report.section("Campaign type", self.campaign_type_mix(campaigns, selections.view));

        let region = selections.region.as_deref().filter(|r| *r != "All");
        report.section("Channel conversion", self.cumulative_conversions(campaigns, region));
        report.section(
            "Calendar",
            self.calendar_heatmap(campaigns, selections.heatmap_year, selections.heatmap_metric),
        );
        report
    }
}
