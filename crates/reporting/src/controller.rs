use crate::chart::PageReport;
use novamart_core::{ColumnAlias, DashboardError, DashboardResult, Table, TableBundle, TableName};
use serde::de::DeserializeOwned;

/// One dashboard page: bundle plus user selections in, charts out.
///
/// Implementations never mutate the bundle and never fail; problems are
/// reported as notices on the returned [`PageReport`].
pub trait PageController {
    type Selections: DeserializeOwned + Default;

    fn render(&self, bundle: &TableBundle, selections: &Self::Selections) -> PageReport;
}

/// Fail with `ColumnMissing` on the first absent column.
pub(crate) fn require(table: &Table, name: TableName, columns: &[&str]) -> DashboardResult<()> {
    match columns.iter().find(|c| !table.has_column(c)) {
        Some(column) => Err(missing(name, column)),
        None => Ok(()),
    }
}

/// Resolve an alias or fail with `ColumnMissing` naming its preferred column.
pub(crate) fn resolve(
    table: &Table,
    name: TableName,
    alias: ColumnAlias,
) -> DashboardResult<&'static str> {
    alias
        .resolve(table)
        .ok_or_else(|| missing(name, alias.primary()))
}

pub(crate) fn missing(name: TableName, column: &str) -> DashboardError {
    DashboardError::ColumnMissing {
        table: name.key().to_string(),
        column: column.to_string(),
    }
}

/// Aggregation result, or `ColumnMissing` when the input lacked a column.
pub(crate) fn present<T>(value: Option<T>, name: TableName, column: &str) -> DashboardResult<T> {
    value.ok_or_else(|| missing(name, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use novamart_core::Column;

    #[test]
    fn test_require_names_first_missing_column() {
        let t = Table::try_new(vec![Column::numbers("revenue", [1.0])]).unwrap();
        assert!(require(&t, TableName::Campaigns, &["revenue"]).is_ok());
        let err = require(&t, TableName::Campaigns, &["revenue", "channel", "spend"]).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::ColumnMissing { ref table, ref column }
                if table == "campaigns" && column == "channel"
        ));
    }

    #[test]
    fn test_resolve_alias() {
        let t = Table::try_new(vec![Column::numbers("ltv", [1.0])]).unwrap();
        assert_eq!(resolve(&t, TableName::Customers, ColumnAlias::LifetimeValue).unwrap(), "ltv");
        assert!(!resolve(&t, TableName::Customers, ColumnAlias::Income)
            .unwrap_err()
            .is_fatal());
    }
}
