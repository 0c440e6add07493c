use crate::calendar::with_calendar_fields;
use novamart_core::Table;
use serde::Serialize;

/// Headline campaign KPIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_revenue: f64,
    pub total_conversions: f64,
    pub avg_roas: f64,
    pub total_spend: f64,
}

impl SummaryStats {
    /// Revenue net of ad spend.
    pub fn net_return(&self) -> f64 {
        self.total_revenue - self.total_spend
    }
}

/// Sums of revenue, conversions and spend, and mean ROAS. Absent columns
/// contribute zero; missing cells are skipped.
pub fn summary_stats(campaigns: &Table) -> SummaryStats {
    let campaigns = with_calendar_fields(campaigns);
    let sum = |name: &str| campaigns.column(name).map_or(0.0, |c| c.sum());

    SummaryStats {
        total_revenue: sum("revenue"),
        total_conversions: sum("conversions"),
        avg_roas: campaigns
            .column("roas")
            .and_then(|c| c.mean())
            .unwrap_or(0.0),
        total_spend: sum("spend"),
    }
}
