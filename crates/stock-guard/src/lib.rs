//! # Stock Guard
//!
//! A shop module that hides a product from the storefront once its total available stock
//! drops to zero or below. It never turns a product back on.
//!
//! ## Entry Points
//!
//! [`AutoDisableModule`] is what the host calls:
//!
//! - **install** - subscribes to the stock-quantity hook; from 1.1.0 it also scans every
//!   active product, and from 1.2.1 it clears caches when the scan disabled something
//! - **stock quantity changed** - re-checks one product after its stock moved
//! - **uninstall** - logs and unsubscribes
//!
//! None of them fail. Errors are written to the host log through [`shop_host::LogSink`]
//! and mirrored to `tracing`.
//!
//! ## Layout
//!
//! - [`config`] - module name, hook name, release, cache locations
//! - [`rule`] and [`disabler`] - the zero-stock check and the idempotent disable
//! - [`handler`] - per-event hook handling
//! - [`scanner`] - the install scan
//! - [`cache`] - render cache and on-disk cache invalidation
//! - [`lifecycle`] - the module itself, plus [`GuardedShop`] to run it in memory

pub mod cache;
pub mod config;
pub mod disabler;
pub mod error;
pub mod handler;
pub mod journal;
pub mod lifecycle;
pub mod rule;
pub mod scanner;

pub use cache::{CacheFailure, CacheInvalidator, CacheReport};
pub use config::{CachePaths, ConfigError, GuardConfig, ModuleVersion};
pub use disabler::{DisableOutcome, ProductDisabler};
pub use error::GuardError;
pub use handler::{HandlerOutcome, StockChangeHandler};
pub use journal::Journal;
pub use lifecycle::{AutoDisableModule, GuardedShop, InstallContext, InstallReport};
pub use rule::{RuleOutcome, ZeroStockRule};
pub use scanner::{BulkZeroStockScanner, ScanReport};
