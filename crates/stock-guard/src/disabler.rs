//! # Product Disabler
//!
//! Hides one product from the storefront. Shared by the stock-change hook and the
//! install scan.
//!
//! The sequence is load → check → flip → persist:
//!
//! | Situation                       | Log                  | Outcome                            |
//! |---------------------------------|----------------------|------------------------------------|
//! | product missing in the shop     | warning              | [`DisableOutcome::NotFound`]        |
//! | already inactive                | none                 | [`DisableOutcome::AlreadyInactive`] |
//! | host saved the update           | info (stock, shop)   | [`DisableOutcome::Disabled`]        |
//! | host refused the update         | error                | [`DisableOutcome::PersistRejected`] |
//! | host failed (load or persist)   | error with message   | [`DisableOutcome::Failed`]          |
//!
//! No path returns an error to the caller.

use crate::error::GuardError;
use crate::journal::Journal;
use shop_host::{ProductId, ProductStore, Severity, ShopId, StockLevel};
use std::sync::Arc;
use tracing::{debug, instrument};

/// What [`ProductDisabler::disable`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableOutcome {
    Disabled,
    AlreadyInactive,
    NotFound,
    PersistRejected,
    Failed,
}

/// Flips a product's active flag to `false` and persists it.
#[derive(Clone)]
pub struct ProductDisabler {
    products: Arc<dyn ProductStore>,
    journal: Journal,
}

impl ProductDisabler {
    pub fn new(products: Arc<dyn ProductStore>, journal: Journal) -> Self {
        Self { products, journal }
    }

    /// Disables the product in `shop_id`. `current_stock` is only reported in the log.
    #[instrument(skip_all, fields(%product_id, %shop_id, stock = current_stock.get()))]
    pub async fn disable(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
        current_stock: StockLevel,
    ) -> DisableOutcome {
        match self.try_disable(product_id, shop_id, current_stock).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.journal.product(
                    Severity::Error,
                    product_id,
                    format_args!("Error disabling product ID {product_id}: {err}"),
                );
                DisableOutcome::Failed
            }
        }
    }

    async fn try_disable(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
        current_stock: StockLevel,
    ) -> Result<DisableOutcome, GuardError> {
        let loaded = self
            .products
            .load(product_id, shop_id)
            .await
            .map_err(|source| GuardError::Load { product_id, source })?;

        let Some(mut record) = loaded else {
            self.journal.product(
                Severity::Warning,
                product_id,
                format_args!("Product ID {product_id} not found"),
            );
            return Ok(DisableOutcome::NotFound);
        };

        if !record.active {
            debug!("Already inactive");
            return Ok(DisableOutcome::AlreadyInactive);
        }

        self.products.set_active(&mut record, false);
        let saved = self
            .products
            .persist(&record)
            .await
            .map_err(|source| GuardError::Persist { product_id, source })?;

        if saved {
            self.journal.product(
                Severity::Info,
                product_id,
                format_args!(
                    "Product ID {product_id} disabled (stock: {current_stock}, shop: {shop_id})"
                ),
            );
            Ok(DisableOutcome::Disabled)
        } else {
            self.journal.product(
                Severity::Error,
                product_id,
                format_args!("Failed to disable product ID {product_id}"),
            );
            Ok(DisableOutcome::PersistRejected)
        }
    }
}
