//! Keeps a single release asset in sync with its upstream GitHub release.
//!
//! One run queries the release, compares the asset's update time against a
//! local reference, downloads to `<target>.tmp` and only promotes the file
//! when its SHA-256 differs from the current copy.

pub mod app_state;
pub mod checksum;
pub mod config;
mod error;
pub mod github;
pub mod logging;
pub mod record;
pub mod update;

pub use error::{Error, Result};
