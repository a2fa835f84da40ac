//! # Shop Host
//!
//! This crate describes the **host platform** that the stock guard module runs inside:
//! the catalog, the inventory, the hook registry, the render caches and the log table.
//! The module never talks to a concrete platform. It talks to the narrow **ports**
//! defined here, and the host (or a test) decides what sits behind them.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into three layers:
//!
//! 1. **Model Layer** ([`model`]) - Ids, stock levels, product handles, log records and the
//!    stock-change event fired by the host.
//! 2. **Port Layer** ([`ports`]) - One async trait per host capability ([`StockReader`],
//!    [`ProductStore`], [`CatalogListing`], [`HookRegistry`], [`RenderCache`], [`LogSink`]),
//!    bundled together as [`HostPorts`].
//! 3. **Runtime Layer** ([`ShopActor`] / [`ShopClient`]) - An in-memory host that owns all
//!    shop state in a single Tokio task and implements every port.
//!
//! ## Explicit Context
//!
//! Nothing is looked up from ambient globals. The shop a call applies to travels with the
//! call ([`ShopId`]), and the collaborators are injected once as a [`HostPorts`] bundle.
//!
//! ```rust
//! use shop_host::{HostPorts, ProductId, SeedProduct, ShopActor, ShopId, StockReader, TracingLogSink};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, shop) = ShopActor::new(16);
//!     tokio::spawn(actor.run());
//!
//!     let id = ProductId::new(7)?;
//!     shop.add_product(SeedProduct::simple(id, ShopId::DEFAULT, "Mug", 3)).await?;
//!
//!     let ports = HostPorts::from_host(shop, Arc::new(TracingLogSink));
//!     let stock = ports.stock.total_available_stock(id, ShopId::DEFAULT).await?;
//!     assert_eq!(stock.get(), 3);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides recording fakes for every port so the module's logic can be
//! exercised deterministically, including failure paths a real host rarely produces.

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod mock;
pub mod model;
pub mod ports;
pub mod tracing;

// Re-export core types for convenience
pub use actor::{SeedProduct, ShopActor, DEFAULT_STOCK_HOOK};
pub use client::ShopClient;
pub use error::{HostError, InvalidProductId};
pub use message::{Response, ShopRequest};
pub use model::{
    CombinationId, LogEntry, ProductId, ProductRecord, Severity, ShopId, StockLevel,
    StockQuantityChanged, SubjectType,
};
pub use ports::{
    CatalogListing, HookRegistry, HostPorts, LogSink, ProductStore, RenderCache, StockReader,
};
pub use crate::tracing::{setup_tracing, TracingLogSink};
