//! # Shop Messages
//!
//! Requests sent from a [`ShopClient`](crate::ShopClient) to the [`ShopActor`](crate::ShopActor).
//! Each variant carries a one-shot responder, so every request gets exactly one reply.

use crate::actor::SeedProduct;
use crate::error::HostError;
use crate::model::{CombinationId, ProductId, ProductRecord, ShopId, StockLevel, StockQuantityChanged};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the shop actor.
pub type Response<T> = oneshot::Sender<Result<T, HostError>>;

/// Internal message type sent to the actor to request operations.
///
/// The first group mirrors the ports; the admin group is what a back office (or a test)
/// uses to seed and move stock.
#[derive(Debug)]
pub enum ShopRequest {
    // --- Ports ---
    TotalStock {
        product_id: ProductId,
        shop_id: ShopId,
        respond_to: Response<StockLevel>,
    },
    Load {
        product_id: ProductId,
        shop_id: ShopId,
        respond_to: Response<Option<ProductRecord>>,
    },
    Persist {
        record: ProductRecord,
        respond_to: Response<bool>,
    },
    ListActive {
        shop_id: ShopId,
        respond_to: Response<Vec<ProductId>>,
    },
    RegisterHook {
        hook: String,
        respond_to: Response<bool>,
    },
    UnregisterHook {
        hook: String,
        respond_to: Response<bool>,
    },
    InvalidateRenderCaches {
        respond_to: Response<()>,
    },

    // --- Admin ---
    AddProduct {
        product: SeedProduct,
        respond_to: Response<()>,
    },
    /// Sets one combination's quantity. Replies with the event the host would dispatch,
    /// or `None` when no hook is subscribed.
    SetQuantity {
        product_id: ProductId,
        shop_id: ShopId,
        combination: CombinationId,
        quantity: i64,
        respond_to: Response<Option<StockQuantityChanged>>,
    },
    RenderCacheInvalidations {
        respond_to: Response<u32>,
    },
}
