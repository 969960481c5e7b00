//! Discovery of installed games across storefronts, launchers and the
//! operating system's installed-programs list.
//!
//! ```no_run
//! use gamescan::{Config, GameService};
//!
//! # async fn run() {
//! let service = GameService::new(Config::load().unwrap_or_default());
//! if let Ok(response) = service.discover_games().await {
//!     println!("{} games", response.total);
//! }
//! # }
//! ```

pub mod cancel;
pub mod classifier;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executable;
pub mod model;
pub mod output;
pub mod platform;
pub mod registry;
pub mod scanner;
pub mod service;
pub mod size;
pub mod usage;
pub mod vdf;

pub use cancel::CancelToken;
pub use config::Config;
pub use discovery::{discover, find};
pub use error::GameScanError;
pub use model::{
    Catalog, DiscoverResponse, ErrorResponse, GameInfo, InstallRecord, LaunchResponse, Platform,
    Source,
};
pub use scanner::{ScanContext, Scanner};
pub use service::GameService;
