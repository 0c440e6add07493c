//! Shared model for the NovaMart analytics backend: dataset registry,
//! typed tables, error taxonomy, configuration, and column aliases.

pub mod aliases;
pub mod bundle;
pub mod config;
pub mod error;
pub mod table;
pub mod value;

pub use aliases::ColumnAlias;
pub use bundle::{TableBundle, TableName};
pub use config::AppConfig;
pub use error::{DashboardError, DashboardResult};
pub use table::{Column, Table};
pub use value::{parse_date, ColumnKind, Value};
