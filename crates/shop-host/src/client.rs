//! # Shop Client
//!
//! The `ShopClient` is the cloneable handle on a running [`ShopActor`](crate::ShopActor).
//! It implements every host port by forwarding a [`ShopRequest`] over the actor's channel
//! and awaiting the one-shot reply.

use crate::actor::SeedProduct;
use crate::error::HostError;
use crate::message::{Response, ShopRequest};
use crate::model::{
    CombinationId, ProductId, ProductRecord, ShopId, StockLevel, StockQuantityChanged,
};
use crate::ports::{CatalogListing, HookRegistry, ProductStore, RenderCache, StockReader};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Cloneable handle on the in-memory shop. Holds only a sender.
#[derive(Clone)]
pub struct ShopClient {
    sender: mpsc::Sender<ShopRequest>,
}

impl ShopClient {
    pub fn new(sender: mpsc::Sender<ShopRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> ShopRequest,
    ) -> Result<T, HostError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| HostError::ActorClosed)?;
        response.await.map_err(|_| HostError::ActorDropped)?
    }

    /// Seeds a product into the shop.
    #[instrument(skip(self, product), fields(product_id = %product.id, shop_id = %product.shop_id))]
    pub async fn add_product(&self, product: SeedProduct) -> Result<(), HostError> {
        debug!("Sending request");
        self.request(|respond_to| ShopRequest::AddProduct {
            product,
            respond_to,
        })
        .await
    }

    /// Updates one combination's quantity, the way a back-office edit or an order would.
    ///
    /// Returns the event the host dispatches to subscribed hooks, if any hook is subscribed.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
        combination: CombinationId,
        quantity: i64,
    ) -> Result<Option<StockQuantityChanged>, HostError> {
        debug!("Sending request");
        self.request(|respond_to| ShopRequest::SetQuantity {
            product_id,
            shop_id,
            combination,
            quantity,
            respond_to,
        })
        .await
    }

    /// Number of render cache invalidations the shop has served.
    pub async fn render_cache_invalidations(&self) -> Result<u32, HostError> {
        self.request(|respond_to| ShopRequest::RenderCacheInvalidations { respond_to })
            .await
    }
}

#[async_trait]
impl StockReader for ShopClient {
    async fn total_available_stock(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
    ) -> Result<StockLevel, HostError> {
        self.request(|respond_to| ShopRequest::TotalStock {
            product_id,
            shop_id,
            respond_to,
        })
        .await
    }
}

#[async_trait]
impl ProductStore for ShopClient {
    async fn load(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
    ) -> Result<Option<ProductRecord>, HostError> {
        self.request(|respond_to| ShopRequest::Load {
            product_id,
            shop_id,
            respond_to,
        })
        .await
    }

    async fn persist(&self, record: &ProductRecord) -> Result<bool, HostError> {
        let record = record.clone();
        self.request(|respond_to| ShopRequest::Persist { record, respond_to })
            .await
    }
}

#[async_trait]
impl CatalogListing for ShopClient {
    async fn list_active_product_ids(&self, shop_id: ShopId) -> Result<Vec<ProductId>, HostError> {
        self.request(|respond_to| ShopRequest::ListActive {
            shop_id,
            respond_to,
        })
        .await
    }
}

#[async_trait]
impl HookRegistry for ShopClient {
    async fn register_hook(&self, hook: &str) -> Result<bool, HostError> {
        let hook = hook.to_string();
        self.request(|respond_to| ShopRequest::RegisterHook { hook, respond_to })
            .await
    }

    async fn unregister_hook(&self, hook: &str) -> Result<bool, HostError> {
        let hook = hook.to_string();
        self.request(|respond_to| ShopRequest::UnregisterHook { hook, respond_to })
            .await
    }
}

#[async_trait]
impl RenderCache for ShopClient {
    async fn invalidate_render_caches(&self) -> Result<(), HostError> {
        self.request(|respond_to| ShopRequest::InvalidateRenderCaches { respond_to })
            .await
    }
}
