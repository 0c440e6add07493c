//! Page controllers for the NovaMart marketing dashboard.
//!
//! Each page is a pure function of the loaded [`TableBundle`] and the
//! user's selections, producing a [`PageReport`]: a list of declarative
//! chart specifications plus the notices shown alongside them.
//!
//! [`TableBundle`]: novamart_core::TableBundle

pub mod attribution;
pub mod campaign;
pub mod chart;
pub mod controller;
pub mod customer;
pub mod executive;
pub mod funnel;
pub mod geographic;
pub mod ml;
pub mod page;
pub mod product;

#[cfg(test)]
mod fixtures;

pub use attribution::{AttributionFunnel, AttributionSelections};
pub use campaign::{CampaignAnalytics, CampaignSelections};
pub use chart::{ChartKind, ChartSpec, Encoding, Notice, NoticeLevel, Orientation, PageReport, MAX_CHARTS};
pub use controller::PageController;
pub use customer::{CustomerInsights, CustomerSelections};
pub use executive::{ExecutiveOverview, ExecutiveSelections};
pub use funnel::{analyze_funnel, FunnelResult, FunnelStepResult};
pub use geographic::{GeoSelections, GeographicAnalysis};
pub use ml::{MlEvaluation, MlSelections};
pub use page::Page;
pub use product::{ProductPerformance, ProductSelections};
