//! Dataset loader. Resolves the data directory and reads the eleven
//! marketing CSV files into a single immutable table bundle.

pub mod loader;
pub mod reader;
pub mod source;

pub use loader::{load_all, load_from_dir, load_table};
pub use reader::{read_table, ReadOptions};
pub use source::resolve_data_dir;
