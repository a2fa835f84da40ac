//! # Shop Actor
//!
//! The `ShopActor` is an in-memory host platform. It owns every product, every stock row
//! and the hook subscriptions, and processes [`ShopRequest`]s sequentially in its own Tokio
//! task. Because the loop has exclusive ownership of the state, no locks are needed.
//!
//! # Usage Pattern
//!
//! 1.  **Create**: Call `ShopActor::new()` to get the `actor` (server) and `client` (interface).
//! 2.  **Run**: Spawn `actor.run()` in a background task.
//! 3.  **Shut down**: Drop every clone of the client; the loop exits when the channel closes.

use crate::client::ShopClient;
use crate::error::HostError;
use crate::message::ShopRequest;
use crate::model::{
    CombinationId, ProductId, ProductRecord, ShopId, StockLevel, StockQuantityChanged,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Hook name the host fires on stock quantity updates unless told otherwise.
pub const DEFAULT_STOCK_HOOK: &str = "actionUpdateQuantity";

/// A product to seed into the in-memory shop.
#[derive(Debug, Clone)]
pub struct SeedProduct {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub name: String,
    pub active: bool,
    /// Quantity per combination. Combination `0` is the product itself.
    pub stock: BTreeMap<CombinationId, i64>,
}

impl SeedProduct {
    /// An active product without combinations.
    pub fn simple(id: ProductId, shop_id: ShopId, name: impl Into<String>, quantity: i64) -> Self {
        Self {
            id,
            shop_id,
            name: name.into(),
            active: true,
            stock: BTreeMap::from([(0, quantity)]),
        }
    }

    /// Adds a combination row. The product-level row is dropped once combinations exist.
    pub fn with_combination(mut self, combination: CombinationId, quantity: i64) -> Self {
        self.stock.remove(&0);
        self.stock.insert(combination, quantity);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

#[derive(Debug)]
struct ShopProduct {
    name: String,
    active: bool,
    stock: BTreeMap<CombinationId, i64>,
}

impl ShopProduct {
    /// Sum over all combinations. Fails instead of wrapping when the rows overflow `i64`.
    fn total(&self) -> Result<StockLevel, HostError> {
        self.stock
            .values()
            .try_fold(0i64, |total, quantity| total.checked_add(*quantity))
            .map(StockLevel)
            .ok_or_else(|| HostError::Query(format!("stock total of {} overflows", self.name)))
    }
}

/// In-memory host that answers every port request.
pub struct ShopActor {
    receiver: mpsc::Receiver<ShopRequest>,
    products: HashMap<(ProductId, ShopId), ShopProduct>,
    hooks: HashSet<String>,
    /// Hook fired by `SetQuantity`.
    stock_hook: String,
    render_cache_invalidations: u32,
}

impl ShopActor {
    pub fn new(buffer_size: usize) -> (Self, ShopClient) {
        Self::with_stock_hook(buffer_size, DEFAULT_STOCK_HOOK)
    }

    /// Like [`ShopActor::new`], but quantity updates fire `stock_hook` instead of
    /// [`DEFAULT_STOCK_HOOK`].
    pub fn with_stock_hook(buffer_size: usize, stock_hook: impl Into<String>) -> (Self, ShopClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            products: HashMap::new(),
            hooks: HashSet::new(),
            stock_hook: stock_hook.into(),
            render_cache_invalidations: 0,
        };
        (actor, ShopClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    pub async fn run(mut self) {
        info!("Shop actor started");

        while let Some(msg) = self.receiver.recv().await {
            self.handle(msg);
        }

        info!(products = self.products.len(), "Shutdown");
    }

    fn handle(&mut self, msg: ShopRequest) {
        match msg {
            ShopRequest::TotalStock {
                product_id,
                shop_id,
                respond_to,
            } => {
                let stock = self
                    .products
                    .get(&(product_id, shop_id))
                    .map_or(Ok(StockLevel(0)), ShopProduct::total);
                match &stock {
                    Ok(stock) => debug!(%product_id, %shop_id, %stock, "TotalStock"),
                    Err(err) => warn!(%product_id, %shop_id, %err, "TotalStock"),
                }
                let _ = respond_to.send(stock);
            }
            ShopRequest::Load {
                product_id,
                shop_id,
                respond_to,
            } => {
                let record = self
                    .products
                    .get(&(product_id, shop_id))
                    .map(|product| ProductRecord {
                        id: product_id,
                        shop_id,
                        active: product.active,
                    });
                debug!(%product_id, %shop_id, found = record.is_some(), "Load");
                let _ = respond_to.send(Ok(record));
            }
            ShopRequest::Persist { record, respond_to } => {
                match self.products.get_mut(&(record.id, record.shop_id)) {
                    Some(product) => {
                        product.active = record.active;
                        info!(product_id = %record.id, shop_id = %record.shop_id, active = record.active, "Persisted");
                        let _ = respond_to.send(Ok(true));
                    }
                    None => {
                        warn!(product_id = %record.id, shop_id = %record.shop_id, "Persist of unknown product");
                        let _ = respond_to.send(Ok(false));
                    }
                }
            }
            ShopRequest::ListActive {
                shop_id,
                respond_to,
            } => {
                let mut ids: Vec<ProductId> = self
                    .products
                    .iter()
                    .filter(|((_, shop), product)| *shop == shop_id && product.active)
                    .map(|((id, _), _)| *id)
                    .collect();
                ids.sort();
                debug!(%shop_id, count = ids.len(), "ListActive");
                let _ = respond_to.send(Ok(ids));
            }
            ShopRequest::RegisterHook { hook, respond_to } => {
                let added = self.hooks.insert(hook.clone());
                info!(%hook, added, "Hook registered");
                let _ = respond_to.send(Ok(true));
            }
            ShopRequest::UnregisterHook { hook, respond_to } => {
                let removed = self.hooks.remove(&hook);
                info!(%hook, removed, "Hook unregistered");
                let _ = respond_to.send(Ok(removed));
            }
            ShopRequest::InvalidateRenderCaches { respond_to } => {
                self.render_cache_invalidations += 1;
                info!(count = self.render_cache_invalidations, "Render caches invalidated");
                let _ = respond_to.send(Ok(()));
            }
            ShopRequest::AddProduct {
                product,
                respond_to,
            } => {
                let key = (product.id, product.shop_id);
                if self.products.contains_key(&key) {
                    warn!(product_id = %product.id, shop_id = %product.shop_id, "Duplicate product");
                    let _ = respond_to.send(Err(HostError::Rejected(format!(
                        "product {} already exists in shop {}",
                        product.id, product.shop_id
                    ))));
                    return;
                }
                info!(product_id = %product.id, shop_id = %product.shop_id, name = %product.name, "Product added");
                self.products.insert(
                    key,
                    ShopProduct {
                        name: product.name,
                        active: product.active,
                        stock: product.stock,
                    },
                );
                let _ = respond_to.send(Ok(()));
            }
            ShopRequest::SetQuantity {
                product_id,
                shop_id,
                combination,
                quantity,
                respond_to,
            } => {
                let Some(product) = self.products.get_mut(&(product_id, shop_id)) else {
                    warn!(%product_id, %shop_id, "SetQuantity on unknown product");
                    let _ = respond_to.send(Err(HostError::Query(format!(
                        "product {product_id} not found in shop {shop_id}"
                    ))));
                    return;
                };
                product.stock.insert(combination, quantity);
                info!(%product_id, %shop_id, combination, quantity, name = %product.name, total = ?product.total().ok(), "Quantity updated");

                let event = self.hooks.contains(&self.stock_hook).then(|| {
                    StockQuantityChanged::new(i64::from(product_id), i64::from(combination), shop_id)
                });
                let _ = respond_to.send(Ok(event));
            }
            ShopRequest::RenderCacheInvalidations { respond_to } => {
                let _ = respond_to.send(Ok(self.render_cache_invalidations));
            }
        }
    }
}
