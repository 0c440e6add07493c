//! Geographic analysis: state rankings, revenue share and satisfaction.

use crate::chart::{ChartKind, ChartSpec, PageReport};
use crate::controller::{present, resolve, PageController};
use novamart_analytics::{group_by, sort_by, top_n, Agg};
use novamart_core::{ColumnAlias, DashboardResult, Table, TableBundle, TableName};
use serde::Deserialize;

const TOP_STATES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoMetric {
    #[default]
    Revenue,
    Customers,
    MarketPenetration,
    Satisfaction,
}

impl GeoMetric {
    fn alias(&self) -> ColumnAlias {
        match self {
            GeoMetric::Revenue => ColumnAlias::GeoRevenue,
            GeoMetric::Customers => ColumnAlias::GeoCustomers,
            GeoMetric::MarketPenetration => ColumnAlias::MarketPenetration,
            GeoMetric::Satisfaction => ColumnAlias::GeoSatisfaction,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            GeoMetric::Revenue => "Revenue",
            GeoMetric::Customers => "Customers",
            GeoMetric::MarketPenetration => "Market Penetration",
            GeoMetric::Satisfaction => "Satisfaction",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeoSelections {
    pub metric: GeoMetric,
    /// Number of states ranked, clamped to 5..=15.
    pub limit: usize,
}

impl Default for GeoSelections {
    fn default() -> Self {
        Self {
            metric: GeoMetric::default(),
            limit: 10,
        }
    }
}

#[derive(Default)]
pub struct GeographicAnalysis;

fn geo(table: &Table, alias: ColumnAlias) -> DashboardResult<&'static str> {
    resolve(table, TableName::Geographic, alias)
}

impl GeographicAnalysis {
    fn top_states(&self, geographic: &Table, selections: &GeoSelections) -> DashboardResult<Vec<ChartSpec>> {
        let metric = geo(geographic, selections.metric.alias())?;
        let state = geo(geographic, ColumnAlias::State)?;
        let limit = selections.limit.clamp(5, 15);
        let data = present(top_n(geographic, metric, limit), TableName::Geographic, metric)?;

        Ok(vec![ChartSpec::new(
            "top_states",
            ChartKind::Bar,
            format!("Top {limit} States by {}", selections.metric.label()),
            data.select(&[state, metric]),
        )
        .x(metric)
        .y(state)
        .color(metric)
        .text(metric)
        .horizontal()])
    }

    fn revenue_share(&self, geographic: &Table) -> DashboardResult<Vec<ChartSpec>> {
        let revenue = geo(geographic, ColumnAlias::GeoRevenue)?;
        let state = geo(geographic, ColumnAlias::State)?;
        let shares = group_by(geographic, &[state], revenue, Agg::Sum).and_then(|t| sort_by(&t, revenue, true));
        let data = present(shares, TableName::Geographic, revenue)?;

        Ok(vec![ChartSpec::new("revenue_share", ChartKind::Pie, "Revenue Distribution by State", data)
            .x(state)
            .y(revenue)])
    }

    fn revenue_vs_customers(&self, geographic: &Table) -> DashboardResult<Vec<ChartSpec>> {
        let revenue = geo(geographic, ColumnAlias::GeoRevenue)?;
        let customers = geo(geographic, ColumnAlias::GeoCustomers)?;
        let state = geo(geographic, ColumnAlias::State)?;
        let top = present(top_n(geographic, revenue, TOP_STATES), TableName::Geographic, revenue)?;

        Ok(vec![ChartSpec::new(
            "revenue_vs_customers",
            ChartKind::Scatter,
            "Revenue vs. Customer Count by State (Top 10)",
            top.select(&[state, customers, revenue]),
        )
        .x(customers)
        .y(revenue)
        .size(customers)
        .color(state)])
    }

    fn satisfaction(&self, geographic: &Table) -> DashboardResult<Vec<ChartSpec>> {
        let satisfaction = geo(geographic, ColumnAlias::GeoSatisfaction)?;
        let revenue = geo(geographic, ColumnAlias::GeoRevenue)?;
        let state = geo(geographic, ColumnAlias::State)?;
        let top = top_n(geographic, revenue, TOP_STATES).and_then(|t| sort_by(&t, satisfaction, false));
        let data = present(top, TableName::Geographic, satisfaction)?;

        Ok(vec![ChartSpec::new(
            "satisfaction_by_state",
            ChartKind::Bar,
            "Customer Satisfaction by Top States",
            data.select(&[state, satisfaction]),
        )
        .x(satisfaction)
        .y(state)
        .color(satisfaction)
        .horizontal()])
    }
}

impl PageController for GeographicAnalysis {
    type Selections = GeoSelections;

    fn render(&self, bundle: &TableBundle, selections: &GeoSelections) -> PageReport {
        let geographic = bundle.get(TableName::Geographic);
        let mut report = PageReport::new("geographic-analysis");

        report.section(selections.metric.label(), self.top_states(geographic, selections));
        report.section("Geographic distribution", self.revenue_share(geographic));
        report.section("Geographic comparison", self.revenue_vs_customers(geographic));
        report.section("State satisfaction", self.satisfaction(geographic));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use novamart_core::Column;

    fn render(selections: &GeoSelections) -> PageReport {
        GeographicAnalysis.render(&fixtures::bundle(), selections)
    }

    #[test]
    fn test_limit_is_clamped() {
        let report = render(&GeoSelections {
            limit: 40,
            ..Default::default()
        });
        let top = report.chart("top_states").unwrap();
        // 12 states available, limit clamped to 15
        assert_eq!(top.data.height(), 12);
        assert_eq!(top.title, "Top 15 States by Revenue");

        let report = render(&GeoSelections {
            limit: 1,
            metric: GeoMetric::Customers,
        });
        let top = &report.chart("top_states").unwrap().data;
        assert_eq!(top.height(), 5);
        assert_eq!(top.value(0, "state").unwrap().as_str(), Some("Haryana"));
    }

    #[test]
    fn test_scatter_and_satisfaction_use_top_ten_by_revenue() {
        let report = render(&GeoSelections::default());
        let scatter = &report.chart("revenue_vs_customers").unwrap().data;
        assert_eq!(scatter.height(), 10);
        assert!(!filter_states(scatter).contains(&"Haryana".to_string()));

        let sat = &report.chart("satisfaction_by_state").unwrap().data;
        let scores = sat.column("satisfaction").unwrap().present_f64s();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    fn filter_states(t: &Table) -> Vec<String> {
        t.column("state").unwrap().values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_alias_columns() {
        let geographic = Table::try_new(vec![
            Column::texts("region", ["West", "East"]),
            Column::numbers("sales", [10.0, 30.0]),
            Column::numbers("customer_count", [1.0, 2.0]),
        ])
        .unwrap();
        let bundle = fixtures::bundle_with(TableName::Geographic, geographic);
        let report = GeographicAnalysis.render(&bundle, &GeoSelections::default());
        let pie = &report.chart("revenue_share").unwrap().data;
        assert_eq!(pie.value(0, "region").unwrap().as_str(), Some("East"));
        assert!(report.chart("revenue_vs_customers").is_some());
        // no satisfaction column in any spelling
        assert_eq!(report.warnings().count(), 1);
    }
}
