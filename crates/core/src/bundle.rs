//! Dataset registry and the immutable per-session table bundle.

use crate::error::{DashboardError, DashboardResult};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The eleven datasets every session loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Campaigns,
    Customers,
    Products,
    Leads,
    FeatureImportance,
    LearningCurve,
    Geographic,
    Attribution,
    Funnel,
    Journey,
    Correlation,
}

impl TableName {
    pub const ALL: [TableName; 11] = [
        TableName::Campaigns,
        TableName::Customers,
        TableName::Products,
        TableName::Leads,
        TableName::FeatureImportance,
        TableName::LearningCurve,
        TableName::Geographic,
        TableName::Attribution,
        TableName::Funnel,
        TableName::Journey,
        TableName::Correlation,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TableName::Campaigns => "campaigns",
            TableName::Customers => "customers",
            TableName::Products => "products",
            TableName::Leads => "leads",
            TableName::FeatureImportance => "feature_importance",
            TableName::LearningCurve => "learning_curve",
            TableName::Geographic => "geographic",
            TableName::Attribution => "attribution",
            TableName::Funnel => "funnel",
            TableName::Journey => "journey",
            TableName::Correlation => "correlation",
        }
    }

    /// Source file inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            TableName::Campaigns => "campaign_performance.csv",
            TableName::Customers => "customer_data.csv",
            TableName::Products => "product_sales.csv",
            TableName::Leads => "lead_scoring_results.csv",
            TableName::FeatureImportance => "feature_importance.csv",
            TableName::LearningCurve => "learning_curve.csv",
            TableName::Geographic => "geographic_data.csv",
            TableName::Attribution => "channel_attribution.csv",
            TableName::Funnel => "funnel_data.csv",
            TableName::Journey => "customer_journey.csv",
            TableName::Correlation => "correlation_matrix.csv",
        }
    }

    /// Whether the first CSV column holds row labels rather than data.
    pub fn has_row_labels(&self) -> bool {
        matches!(self, TableName::Correlation)
    }

    /// Whether a `date` column, when present, is coerced to calendar dates.
    pub fn parses_dates(&self) -> bool {
        matches!(self, TableName::Campaigns)
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// All loaded tables for a session. Always complete; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBundle {
    tables: Vec<Table>,
}

impl TableBundle {
    /// Assemble a bundle. Fails unless every [`TableName`] is present.
    pub fn new(mut tables: BTreeMap<TableName, Table>) -> DashboardResult<Self> {
        let missing: Vec<String> = TableName::ALL
            .iter()
            .filter(|name| !tables.contains_key(name))
            .map(|name| name.key().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::IncompleteBundle { missing });
        }
        let tables = TableName::ALL
            .iter()
            .filter_map(|name| tables.remove(name))
            .collect();
        Ok(Self { tables })
    }

    pub fn get(&self, name: TableName) -> &Table {
        &self.tables[name.slot()]
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableName, &Table)> {
        TableName::ALL.iter().copied().zip(self.tables.iter())
    }

    pub fn campaigns(&self) -> &Table {
        self.get(TableName::Campaigns)
    }

    pub fn customers(&self) -> &Table {
        self.get(TableName::Customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn one_row(tag: f64) -> Table {
        Table::try_new(vec![Column::numbers("x", [tag])]).unwrap()
    }

    #[test]
    fn test_slots_follow_registry_order() {
        for (i, name) in TableName::ALL.iter().enumerate() {
            assert_eq!(name.slot(), i);
        }
    }

    #[test]
    fn test_file_names_are_unique() {
        let mut files: Vec<_> = TableName::ALL.iter().map(|n| n.file_name()).collect();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), 11);
    }

    #[test]
    fn test_bundle_requires_all_tables() {
        let mut tables = BTreeMap::new();
        tables.insert(TableName::Campaigns, one_row(1.0));
        let err = TableBundle::new(tables).unwrap_err();
        match err {
            DashboardError::IncompleteBundle { missing } => {
                assert_eq!(missing.len(), 10);
                assert!(missing.contains(&"correlation".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bundle_lookup_by_name() {
        let tables: BTreeMap<_, _> = TableName::ALL
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, one_row(i as f64)))
            .collect();
        let bundle = TableBundle::new(tables).unwrap();
        assert_eq!(bundle.len(), 11);
        assert_eq!(
            bundle.get(TableName::Funnel).value(0, "x").unwrap().as_f64(),
            Some(8.0)
        );
        let names: Vec<_> = bundle.iter().map(|(n, _)| n).collect();
        assert_eq!(names, TableName::ALL.to_vec());
    }
}
