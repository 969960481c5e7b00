//! Core data types for install records, catalogs, and caller responses.
//!
//! - [`InstallRecord`] - One detected installation
//! - [`Source`] - The store an install was found through (Steam, GOG, etc.)
//! - [`Platform`] - Operating system platform
//! - [`Catalog`] - Deduplicated, ordered result of a discovery run
//! - [`GameInfo`], [`DiscoverResponse`], [`LaunchResponse`], [`ErrorResponse`] -
//!   JSON shapes handed to callers
//!
//! # Example
//!
//! ```
//! use gamescan::{Catalog, InstallRecord, Source};
//!
//! let record = InstallRecord::new("Portal 2", Source::Steam, "/games/Portal 2");
//! let catalog = Catalog::from_records(vec![record]);
//!
//! println!("Found {} games", catalog.len());
//! ```

mod catalog;
mod record;
mod response;

pub use catalog::*;
pub use record::*;
pub use response::*;
