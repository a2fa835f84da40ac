//! Error types for the stock guard.
//!
//! Errors never leave a public entry point. Each step returns `Result<_, GuardError>` and
//! the entry point that owns the step turns the error into a host log record.

use shop_host::{HostError, InvalidProductId, ProductId};
use thiserror::Error;

/// Errors that can occur while checking stock or disabling a product.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The hook received an id that cannot name a product.
    #[error("Invalid product id: {0}")]
    InvalidProductId(#[from] InvalidProductId),

    #[error("Stock lookup failed for product {product_id}: {source}")]
    StockLookup {
        product_id: ProductId,
        #[source]
        source: HostError,
    },

    #[error("Listing active products failed: {0}")]
    Listing(#[source] HostError),

    #[error("Loading product {product_id} failed: {source}")]
    Load {
        product_id: ProductId,
        #[source]
        source: HostError,
    },

    #[error("Updating product {product_id} failed: {source}")]
    Persist {
        product_id: ProductId,
        #[source]
        source: HostError,
    },

    #[error("Hook registration failed: {0}")]
    HookRegistration(#[source] HostError),
}

impl GuardError {
    /// Product the failure is about, when there is one.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            GuardError::StockLookup { product_id, .. }
            | GuardError::Load { product_id, .. }
            | GuardError::Persist { product_id, .. } => Some(*product_id),
            GuardError::InvalidProductId(_)
            | GuardError::Listing(_)
            | GuardError::HookRegistration(_) => None,
        }
    }
}
