//! # Host Ports
//!
//! Ports describe what the module needs from the host platform, without implementing it.
//! Each capability is its own small async trait so a fake can stand in for any one of them.
//!
//! The module reaches the host only through these traits:
//!
//! | Port                | Used by                         |
//! |---------------------|---------------------------------|
//! | [`StockReader`]     | stock-change hook, install scan |
//! | [`ProductStore`]    | product disabler                |
//! | [`CatalogListing`]  | install scan                    |
//! | [`HookRegistry`]    | install / uninstall             |
//! | [`RenderCache`]     | cache invalidation after a scan |
//! | [`LogSink`]         | everything                      |

use crate::error::HostError;
use crate::model::{LogEntry, ProductId, ProductRecord, ShopId, StockLevel};
use async_trait::async_trait;
use std::sync::Arc;

/// Reads computed stock. The host owns the arithmetic across combinations and warehouses.
#[async_trait]
pub trait StockReader: Send + Sync {
    /// Total available stock across all combinations of the product in the shop.
    ///
    /// Must not fail for an unknown product; returning zero is fine.
    async fn total_available_stock(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
    ) -> Result<StockLevel, HostError>;
}

/// Load / mutate / persist lifecycle of a product record.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Loads the product scoped to a shop. `Ok(None)` when it does not exist there.
    async fn load(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
    ) -> Result<Option<ProductRecord>, HostError>;

    /// Changes the active flag on a loaded handle. Nothing is written until [`persist`](Self::persist).
    fn set_active(&self, record: &mut ProductRecord, active: bool) {
        record.active = active;
    }

    /// Writes the handle back. `Ok(false)` means the host refused the update without failing.
    async fn persist(&self, record: &ProductRecord) -> Result<bool, HostError>;
}

/// Catalog queries used by the install scan.
#[async_trait]
pub trait CatalogListing: Send + Sync {
    /// Ids of every product currently marked active in the shop.
    async fn list_active_product_ids(&self, shop_id: ShopId) -> Result<Vec<ProductId>, HostError>;
}

/// Subscription of module hooks with the host's dispatcher.
#[async_trait]
pub trait HookRegistry: Send + Sync {
    async fn register_hook(&self, hook: &str) -> Result<bool, HostError>;

    async fn unregister_hook(&self, hook: &str) -> Result<bool, HostError>;
}

/// Template, compiled-template and page caches kept by the host.
#[async_trait]
pub trait RenderCache: Send + Sync {
    async fn invalidate_render_caches(&self) -> Result<(), HostError>;
}

/// Fire-and-forget structured log sink.
pub trait LogSink: Send + Sync {
    fn log(&self, entry: LogEntry);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn log(&self, entry: LogEntry) {
        (**self).log(entry)
    }
}

/// Every collaborator the module needs, injected once at construction.
#[derive(Clone)]
pub struct HostPorts {
    pub stock: Arc<dyn StockReader>,
    pub products: Arc<dyn ProductStore>,
    pub catalog: Arc<dyn CatalogListing>,
    pub hooks: Arc<dyn HookRegistry>,
    pub render_cache: Option<Arc<dyn RenderCache>>,
    pub log: Arc<dyn LogSink>,
}

impl HostPorts {
    /// Wires every port to a single host implementation.
    pub fn from_host<H>(host: H, log: Arc<dyn LogSink>) -> Self
    where
        H: StockReader + ProductStore + CatalogListing + HookRegistry + RenderCache + 'static,
    {
        let host = Arc::new(host);
        Self {
            stock: host.clone(),
            products: host.clone(),
            catalog: host.clone(),
            hooks: host.clone(),
            render_cache: Some(host),
            log,
        }
    }

    /// Drops the render cache port; cache invalidation then only touches the filesystem.
    pub fn without_render_cache(mut self) -> Self {
        self.render_cache = None;
        self
    }
}
