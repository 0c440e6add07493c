//! Page routing: slug → controller, JSON selections → typed selections.

use crate::attribution::AttributionFunnel;
use crate::campaign::CampaignAnalytics;
use crate::chart::PageReport;
use crate::controller::PageController;
use crate::customer::CustomerInsights;
use crate::executive::ExecutiveOverview;
use crate::geographic::GeographicAnalysis;
use crate::ml::MlEvaluation;
use crate::product::ProductPerformance;
use novamart_analytics::DerivedMetrics;
use novamart_core::{DashboardError, DashboardResult, TableBundle};
use serde::Serialize;
use serde_json::Value as Json;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    ExecutiveOverview,
    CampaignAnalytics,
    CustomerInsights,
    ProductPerformance,
    GeographicAnalysis,
    AttributionFunnel,
    MlEvaluation,
}

impl Page {
    /// Navigation order.
    pub const ALL: [Page; 7] = [
        Page::ExecutiveOverview,
        Page::CampaignAnalytics,
        Page::CustomerInsights,
        Page::ProductPerformance,
        Page::GeographicAnalysis,
        Page::AttributionFunnel,
        Page::MlEvaluation,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::ExecutiveOverview => "executive-overview",
            Page::CampaignAnalytics => "campaign-analytics",
            Page::CustomerInsights => "customer-insights",
            Page::ProductPerformance => "product-performance",
            Page::GeographicAnalysis => "geographic-analysis",
            Page::AttributionFunnel => "attribution-funnel",
            Page::MlEvaluation => "ml-evaluation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::ExecutiveOverview => "Executive Overview",
            Page::CampaignAnalytics => "Campaign Analytics",
            Page::CustomerInsights => "Customer Insights",
            Page::ProductPerformance => "Product Performance",
            Page::GeographicAnalysis => "Geographic Analysis",
            Page::AttributionFunnel => "Attribution & Funnel",
            Page::MlEvaluation => "ML Model Evaluation",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.slug() == slug)
    }

    /// Render this page. `Null` selections mean all defaults; selections
    /// that do not deserialize fail with `Serialization`.
    pub fn render(
        &self,
        bundle: &TableBundle,
        engine: &DerivedMetrics,
        selections: &Json,
    ) -> DashboardResult<PageReport> {
        let report = match self {
            Page::ExecutiveOverview => run(&ExecutiveOverview::new(engine), bundle, selections),
            Page::CampaignAnalytics => run(&CampaignAnalytics::new(engine), bundle, selections),
            Page::CustomerInsights => run(&CustomerInsights::new(engine), bundle, selections),
            Page::ProductPerformance => run(&ProductPerformance, bundle, selections),
            Page::GeographicAnalysis => run(&GeographicAnalysis, bundle, selections),
            Page::AttributionFunnel => run(&AttributionFunnel, bundle, selections),
            Page::MlEvaluation => run(&MlEvaluation, bundle, selections),
        }?;

        info!(
            page = self.slug(),
            charts = report.charts.len(),
            warnings = report.warnings().count(),
            "Page rendered"
        );
        metrics::counter!("dashboard.pages.rendered").increment(1);
        Ok(report)
    }
}

fn run<C: PageController>(
    controller: &C,
    bundle: &TableBundle,
    selections: &Json,
) -> DashboardResult<PageReport> {
    let selections: C::Selections = match selections {
        Json::Null => C::Selections::default(),
        other => serde_json::from_value(other.clone())?,
    };
    debug!("Selections parsed");
    Ok(controller.render(bundle, &selections))
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Page {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::from_slug(s).ok_or_else(|| DashboardError::UnknownPage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    #[test]
    fn test_slug_round_trip() {
        for page in Page::ALL {
            assert_eq!(page.slug().parse::<Page>().unwrap(), page);
        }
        assert!(matches!(
            "budget".parse::<Page>(),
            Err(DashboardError::UnknownPage(ref s)) if s == "budget"
        ));
    }

    #[test]
    fn test_every_page_renders_with_defaults() {
        let bundle = fixtures::bundle();
        let engine = DerivedMetrics::default();
        for page in Page::ALL {
            let report = page.render(&bundle, &engine, &Json::Null).unwrap();
            assert_eq!(report.page, page.slug());
            assert!(!report.charts.is_empty(), "{page} rendered no charts");
        }
    }

    #[test]
    fn test_selections_from_json() {
        let bundle = fixtures::bundle();
        let engine = DerivedMetrics::default();
        let report = Page::GeographicAnalysis
            .render(&bundle, &engine, &json!({ "metric": "customers", "limit": 5 }))
            .unwrap();
        assert_eq!(report.chart("top_states").unwrap().data.height(), 5);
    }

    #[test]
    fn test_bad_selections_fail() {
        let bundle = fixtures::bundle();
        let engine = DerivedMetrics::default();
        let err = Page::MlEvaluation
            .render(&bundle, &engine, &json!({ "threshold": "high" }))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Serialization(_)));
    }

    #[test]
    fn test_serializes_as_slug() {
        assert_eq!(
            serde_json::to_value(Page::AttributionFunnel).unwrap(),
            json!("attribution-funnel")
        );
    }
}
