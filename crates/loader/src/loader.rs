//! All-or-nothing loading of the eleven datasets into a [`TableBundle`].

use crate::reader::{read_table, ReadOptions};
use crate::source::resolve_data_dir;
use novamart_core::config::DataConfig;
use novamart_core::{DashboardError, DashboardResult, Table, TableBundle, TableName};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// Resolve the data directory and load every registered table.
///
/// Any missing file or malformed content aborts the load; no partial bundle
/// is ever returned.
pub fn load_all(config: &DataConfig) -> DashboardResult<TableBundle> {
    let started = Instant::now();
    let result = resolve_data_dir(config).and_then(|dir| load_from_dir(&dir));
    match &result {
        Ok(bundle) => {
            metrics::counter!("loader.bundles_loaded").increment(1);
            info!(
                tables = bundle.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Table bundle loaded"
            );
        }
        Err(e) => {
            metrics::counter!("loader.failures").increment(1);
            error!(error = %e, "Table bundle load failed");
        }
    }
    result
}

/// Load every registered table from `dir`.
pub fn load_from_dir(dir: &Path) -> DashboardResult<TableBundle> {
    let mut tables = BTreeMap::new();
    for name in TableName::ALL {
        let table = load_table(dir, name)?;
        tables.insert(name, table);
    }
    TableBundle::new(tables)
}

/// Load a single registered table from `dir`.
pub fn load_table(dir: &Path, name: TableName) -> DashboardResult<Table> {
    let path = dir.join(name.file_name());
    if !path.is_file() {
        return Err(DashboardError::FileNotFound {
            file: name.file_name().to_string(),
        });
    }
    let file = File::open(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DashboardError::FileNotFound {
            file: name.file_name().to_string(),
        },
        _ => DashboardError::Io(e),
    })?;

    let opts = ReadOptions {
        parse_dates: name.parses_dates(),
        first_column_is_index: name.has_row_labels(),
    };
    read_table(BufReader::new(file), name.file_name(), opts)
}
