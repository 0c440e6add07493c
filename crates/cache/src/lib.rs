#![warn(clippy::unwrap_used)]

pub mod local;
pub mod session;

pub use local::{ViewCache, ViewKey};
pub use session::BundleCache;
