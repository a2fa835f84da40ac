//! # Stock Change Handler
//!
//! Runs once per stock-quantity-change event fired by the host. The event's product id
//! is validated first; an invalid id never reaches the stock reader. Any failure after
//! that is logged against the product and swallowed, since the host expects hook
//! handlers to return quietly whatever happens.

use crate::journal::Journal;
use crate::rule::{RuleOutcome, ZeroStockRule};
use shop_host::{ProductId, Severity, StockQuantityChanged};
use tracing::{debug, instrument};

/// What the handler did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The event did not carry a usable product id.
    InvalidInput,
    Checked(RuleOutcome),
    /// Reading stock failed; the failure was logged.
    Failed,
}

#[derive(Clone)]
pub struct StockChangeHandler {
    rule: ZeroStockRule,
    journal: Journal,
}

impl StockChangeHandler {
    pub fn new(rule: ZeroStockRule, journal: Journal) -> Self {
        Self { rule, journal }
    }

    #[instrument(skip_all, fields(
        product_id = ?event.product_id,
        combination = event.combination(),
        shop_id = %event.shop_id,
    ))]
    pub async fn on_stock_quantity_changed(&self, event: &StockQuantityChanged) -> HandlerOutcome {
        let product_id = match ProductId::parse(event.product_id) {
            Ok(id) => id,
            Err(err) => {
                debug!(%err, "Rejected hook params");
                self.journal
                    .module(Severity::Warning, "Invalid product ID in hook params");
                return HandlerOutcome::InvalidInput;
            }
        };

        match self.rule.apply(product_id, event.shop_id).await {
            Ok(outcome) => HandlerOutcome::Checked(outcome),
            Err(err) => {
                self.journal.module_about(
                    Severity::Error,
                    product_id,
                    format_args!("Error in stock quantity hook: {err}"),
                );
                HandlerOutcome::Failed
            }
        }
    }
}
