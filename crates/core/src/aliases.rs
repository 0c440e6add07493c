//! Prioritized column-name aliases per logical field.
//!
//! Source files name some fields inconsistently (`lifetime_value` vs `ltv`,
//! `state` vs `region`). Each logical field lists its accepted names in
//! priority order; the first one present in a table wins.

use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnAlias {
    LifetimeValue,
    Income,
    Satisfaction,
    State,
    GeoRevenue,
    GeoCustomers,
    MarketPenetration,
    GeoSatisfaction,
    CampaignType,
    ActualConverted,
    ProfitMargin,
}

impl ColumnAlias {
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            ColumnAlias::LifetimeValue => &["lifetime_value", "ltv"],
            ColumnAlias::Income => &["income", "annual_income"],
            ColumnAlias::Satisfaction => &["satisfaction", "nps"],
            ColumnAlias::State => &["state", "region"],
            ColumnAlias::GeoRevenue => &["revenue", "sales"],
            ColumnAlias::GeoCustomers => &["customers", "customer_count"],
            ColumnAlias::MarketPenetration => &["market_penetration", "penetration"],
            ColumnAlias::GeoSatisfaction => &["satisfaction", "satisfaction_score"],
            ColumnAlias::CampaignType => &["campaign_type", "campaign_name"],
            ColumnAlias::ActualConverted => &["actual_converted", "target"],
            ColumnAlias::ProfitMargin => &["profit_margin", "margin"],
        }
    }

    /// Name of the first candidate column present in `table`.
    pub fn resolve(&self, table: &Table) -> Option<&'static str> {
        self.candidates()
            .iter()
            .copied()
            .find(|name| table.has_column(name))
    }

    /// Preferred name, used in "not available" notices.
    pub fn primary(&self) -> &'static str {
        self.candidates()[0]
    }
}
