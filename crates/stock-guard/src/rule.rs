//! The zero-stock rule: read total stock, disable when it is zero or below.
//!
//! There is no opposite branch: a product whose stock comes back stays hidden until
//! someone re-enables it by hand.

use crate::disabler::{DisableOutcome, ProductDisabler};
use crate::error::GuardError;
use shop_host::{ProductId, ShopId, StockLevel, StockReader};
use std::sync::Arc;
use tracing::debug;

/// Result of applying the rule to one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Stock is positive; nothing was done.
    InStock(StockLevel),
    /// Stock is zero or negative; the disabler ran.
    Depleted {
        stock: StockLevel,
        outcome: DisableOutcome,
    },
}

impl RuleOutcome {
    /// `true` when this check flipped the product to inactive.
    pub fn disabled(&self) -> bool {
        matches!(
            self,
            RuleOutcome::Depleted {
                outcome: DisableOutcome::Disabled,
                ..
            }
        )
    }
}

#[derive(Clone)]
pub struct ZeroStockRule {
    stock: Arc<dyn StockReader>,
    disabler: ProductDisabler,
}

impl ZeroStockRule {
    pub fn new(stock: Arc<dyn StockReader>, disabler: ProductDisabler) -> Self {
        Self { stock, disabler }
    }

    /// Applies the rule. Only the stock read can fail; the disabler logs its own failures.
    pub async fn apply(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
    ) -> Result<RuleOutcome, GuardError> {
        let stock = self
            .stock
            .total_available_stock(product_id, shop_id)
            .await
            .map_err(|source| GuardError::StockLookup { product_id, source })?;

        if !stock.is_depleted() {
            debug!(%product_id, %stock, "In stock");
            return Ok(RuleOutcome::InStock(stock));
        }

        let outcome = self.disabler.disable(product_id, shop_id, stock).await;
        Ok(RuleOutcome::Depleted { stock, outcome })
    }
}
