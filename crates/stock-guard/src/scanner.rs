//! # Bulk Zero-Stock Scanner
//!
//! The stock-change hook only sees products whose stock moves after installation.
//! Products that were already sold out when the module was installed are caught by a
//! one-time pass over every active product of the shop.
//!
//! The pass is strictly sequential. The first failure (listing, or a stock read) aborts
//! it; the failure is logged once with no product id and the install carries on.
//! When the pass disabled at least one product and a [`CacheInvalidator`] is wired,
//! caches are cleared after the summary is logged.

use crate::cache::{CacheInvalidator, CacheReport};
use crate::error::GuardError;
use crate::journal::Journal;
use crate::rule::ZeroStockRule;
use shop_host::{CatalogListing, Severity, ShopId};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Summary of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub scanned: usize,
    pub disabled: usize,
    /// The scan stopped on a failure before checking every product.
    pub aborted: bool,
    /// Present only when cache invalidation ran.
    pub cache: Option<CacheReport>,
}

#[derive(Clone)]
pub struct BulkZeroStockScanner {
    catalog: Arc<dyn CatalogListing>,
    rule: ZeroStockRule,
    invalidator: Option<CacheInvalidator>,
    journal: Journal,
}

impl BulkZeroStockScanner {
    pub fn new(
        catalog: Arc<dyn CatalogListing>,
        rule: ZeroStockRule,
        invalidator: Option<CacheInvalidator>,
        journal: Journal,
    ) -> Self {
        Self {
            catalog,
            rule,
            invalidator,
            journal,
        }
    }

    #[instrument(skip(self))]
    pub async fn scan(&self, shop_id: ShopId) -> ScanReport {
        let mut report = ScanReport::default();

        if let Err(err) = self.run(shop_id, &mut report).await {
            warn!(
                %err,
                product_id = ?err.product_id(),
                scanned = report.scanned,
                "Scan aborted"
            );
            report.aborted = true;
            self.journal.module(
                Severity::Error,
                format_args!("Error during initial stock scan: {err}"),
            );
            return report;
        }

        if report.disabled > 0 {
            if let Some(invalidator) = &self.invalidator {
                report.cache = Some(invalidator.invalidate().await);
            }
        }
        report
    }

    async fn run(&self, shop_id: ShopId, report: &mut ScanReport) -> Result<(), GuardError> {
        let product_ids = self
            .catalog
            .list_active_product_ids(shop_id)
            .await
            .map_err(GuardError::Listing)?;

        if product_ids.is_empty() {
            self.journal
                .module(Severity::Info, "No active products found to check");
            return Ok(());
        }

        info!(count = product_ids.len(), "Checking active products");
        for product_id in product_ids {
            let outcome = self.rule.apply(product_id, shop_id).await?;
            report.scanned += 1;
            if outcome.disabled() {
                report.disabled += 1;
            }
        }

        self.journal.module(
            Severity::Info,
            format_args!(
                "Initial scan completed: {} products checked, {} disabled",
                report.scanned, report.disabled
            ),
        );
        Ok(())
    }
}
