//! # Mock Host
//!
//! Utilities for testing the module against a scripted host.
//!
//! [`MockShop`] implements every port on top of a shared, inspectable state. Seed it with
//! the builder methods, inject failures where a test needs them, then assert on the
//! recorded [`MockCall`]s. [`RecordingLogSink`] keeps every [`LogEntry`] for assertions.
//!
//! # Example
//! ```
//! use shop_host::mock::{pid, MockShop, RecordingLogSink};
//! use shop_host::{ShopId, StockReader};
//!
//! # #[tokio::main] async fn main() {
//! let shop = MockShop::new().with_product(1, 0).fail_stock(2);
//! let log = RecordingLogSink::new();
//! let ports = shop.ports(&log);
//!
//! let stock = ports.stock.total_available_stock(pid(1), ShopId::DEFAULT).await.unwrap();
//! assert!(stock.is_depleted());
//! assert!(ports.stock.total_available_stock(pid(2), ShopId::DEFAULT).await.is_err());
//! assert_eq!(shop.stock_reads(), vec![pid(1), pid(2)]);
//! # }
//! ```

use crate::error::HostError;
use crate::model::{LogEntry, ProductId, ProductRecord, Severity, ShopId, StockLevel};
use crate::ports::{
    CatalogListing, HookRegistry, HostPorts, LogSink, ProductStore, RenderCache, StockReader,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

/// Builds a product id in tests. Panics on zero.
pub fn pid(raw: u32) -> ProductId {
    ProductId::new(raw).expect("test product ids are positive")
}

/// A call the mock host received, in order of arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    TotalStock(ProductId, ShopId),
    Load(ProductId, ShopId),
    Persist(ProductRecord),
    ListActive(ShopId),
    RegisterHook(String),
    UnregisterHook(String),
    InvalidateRenderCaches,
}

#[derive(Debug, Clone)]
struct MockProduct {
    active: bool,
    stock: i64,
    /// `false` models stock rows for a product the loader cannot find.
    loadable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum HookBehavior {
    #[default]
    Accept,
    Refuse,
    Fail,
}

#[derive(Debug, Default)]
struct MockState {
    products: BTreeMap<(ProductId, ShopId), MockProduct>,
    listing_error: Option<String>,
    stock_errors: HashSet<ProductId>,
    load_errors: HashSet<ProductId>,
    persist_errors: HashSet<ProductId>,
    persist_rejections: HashSet<ProductId>,
    hook_registration: HookBehavior,
    hook_unregistration_fails: bool,
    render_cache_error: Option<String>,
    calls: Vec<MockCall>,
}

/// Scripted host implementing every port.
///
/// Clones share state, so a test can keep one handle while the module owns another.
#[derive(Clone, Default)]
pub struct MockShop {
    state: Arc<Mutex<MockState>>,
}

impl MockShop {
    pub fn new() -> Self {
        Self::default()
    }

    fn seed(self, raw: u32, shop_id: ShopId, stock: i64, active: bool, loadable: bool) -> Self {
        self.state.lock().unwrap().products.insert(
            (pid(raw), shop_id),
            MockProduct {
                active,
                stock,
                loadable,
            },
        );
        self
    }

    /// An active product with the given total stock in the default shop.
    pub fn with_product(self, raw: u32, stock: i64) -> Self {
        self.seed(raw, ShopId::DEFAULT, stock, true, true)
    }

    /// An active product in a specific shop. Each shop has its own stock and flag.
    pub fn with_product_in(self, raw: u32, shop_id: ShopId, stock: i64) -> Self {
        self.seed(raw, shop_id, stock, true, true)
    }

    /// A product that is already hidden from the storefront.
    pub fn with_inactive_product(self, raw: u32, stock: i64) -> Self {
        self.seed(raw, ShopId::DEFAULT, stock, false, true)
    }

    /// Stock rows exist and the product is listed as active, but loading it finds nothing.
    pub fn with_unloadable_product(self, raw: u32, stock: i64) -> Self {
        self.seed(raw, ShopId::DEFAULT, stock, true, false)
    }

    pub fn fail_listing(self, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().listing_error = Some(message.into());
        self
    }

    pub fn fail_stock(self, raw: u32) -> Self {
        self.state.lock().unwrap().stock_errors.insert(pid(raw));
        self
    }

    pub fn fail_load(self, raw: u32) -> Self {
        self.state.lock().unwrap().load_errors.insert(pid(raw));
        self
    }

    pub fn fail_persist(self, raw: u32) -> Self {
        self.state.lock().unwrap().persist_errors.insert(pid(raw));
        self
    }

    /// The host answers the update with "not saved" instead of an error.
    pub fn reject_persist(self, raw: u32) -> Self {
        self.state.lock().unwrap().persist_rejections.insert(pid(raw));
        self
    }

    pub fn refuse_hook_registration(self) -> Self {
        self.state.lock().unwrap().hook_registration = HookBehavior::Refuse;
        self
    }

    pub fn fail_hook_registration(self) -> Self {
        self.state.lock().unwrap().hook_registration = HookBehavior::Fail;
        self
    }

    pub fn fail_hook_unregistration(self) -> Self {
        self.state.lock().unwrap().hook_unregistration_fails = true;
        self
    }

    pub fn fail_render_cache(self, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().render_cache_error = Some(message.into());
        self
    }

    /// Changes a product's stock in the default shop after construction.
    pub fn set_stock(&self, raw: u32, stock: i64) {
        let key = (pid(raw), ShopId::DEFAULT);
        if let Some(product) = self.state.lock().unwrap().products.get_mut(&key) {
            product.stock = stock;
        }
    }

    /// Wires every port to this mock.
    pub fn ports(&self, log: &RecordingLogSink) -> HostPorts {
        HostPorts::from_host(self.clone(), Arc::new(log.clone()))
    }

    // --- Inspection ---

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Active flag in the default shop.
    pub fn is_active(&self, raw: u32) -> Option<bool> {
        self.is_active_in(raw, ShopId::DEFAULT)
    }

    pub fn is_active_in(&self, raw: u32, shop_id: ShopId) -> Option<bool> {
        self.state
            .lock()
            .unwrap()
            .products
            .get(&(pid(raw), shop_id))
            .map(|product| product.active)
    }

    pub fn stock_reads(&self) -> Vec<ProductId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::TotalStock(id, _) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> Vec<ProductId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Load(id, _) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn persisted(&self) -> Vec<ProductRecord> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Persist(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn listing_calls(&self) -> usize {
        self.count(|call| matches!(call, MockCall::ListActive(_)))
    }

    pub fn render_cache_calls(&self) -> usize {
        self.count(|call| matches!(call, MockCall::InvalidateRenderCaches))
    }

    pub fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn record(&self, call: MockCall) -> std::sync::MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl StockReader for MockShop {
    async fn total_available_stock(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
    ) -> Result<StockLevel, HostError> {
        let state = self.record(MockCall::TotalStock(product_id, shop_id));
        if state.stock_errors.contains(&product_id) {
            return Err(HostError::Query(format!(
                "stock lookup failed for product {product_id}"
            )));
        }
        let stock = state
            .products
            .get(&(product_id, shop_id))
            .map(|product| product.stock)
            .unwrap_or(0);
        Ok(StockLevel(stock))
    }
}

#[async_trait]
impl ProductStore for MockShop {
    async fn load(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
    ) -> Result<Option<ProductRecord>, HostError> {
        let state = self.record(MockCall::Load(product_id, shop_id));
        if state.load_errors.contains(&product_id) {
            return Err(HostError::Unavailable("product table locked".to_string()));
        }
        Ok(state
            .products
            .get(&(product_id, shop_id))
            .filter(|product| product.loadable)
            .map(|product| ProductRecord {
                id: product_id,
                shop_id,
                active: product.active,
            }))
    }

    async fn persist(&self, record: &ProductRecord) -> Result<bool, HostError> {
        let mut state = self.record(MockCall::Persist(record.clone()));
        if state.persist_errors.contains(&record.id) {
            return Err(HostError::Query(format!(
                "update of product {} failed",
                record.id
            )));
        }
        if state.persist_rejections.contains(&record.id) {
            return Ok(false);
        }
        match state.products.get_mut(&(record.id, record.shop_id)) {
            Some(product) => {
                product.active = record.active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CatalogListing for MockShop {
    async fn list_active_product_ids(&self, shop_id: ShopId) -> Result<Vec<ProductId>, HostError> {
        let state = self.record(MockCall::ListActive(shop_id));
        if let Some(message) = &state.listing_error {
            return Err(HostError::Query(message.clone()));
        }
        Ok(state
            .products
            .iter()
            .filter(|((_, shop), product)| *shop == shop_id && product.active)
            .map(|((id, _), _)| *id)
            .collect())
    }
}

#[async_trait]
impl HookRegistry for MockShop {
    async fn register_hook(&self, hook: &str) -> Result<bool, HostError> {
        let state = self.record(MockCall::RegisterHook(hook.to_string()));
        match state.hook_registration {
            HookBehavior::Accept => Ok(true),
            HookBehavior::Refuse => Ok(false),
            HookBehavior::Fail => Err(HostError::Unavailable("hook table unavailable".to_string())),
        }
    }

    async fn unregister_hook(&self, hook: &str) -> Result<bool, HostError> {
        let state = self.record(MockCall::UnregisterHook(hook.to_string()));
        if state.hook_unregistration_fails {
            return Err(HostError::Unavailable("hook table unavailable".to_string()));
        }
        Ok(true)
    }
}

#[async_trait]
impl RenderCache for MockShop {
    async fn invalidate_render_caches(&self) -> Result<(), HostError> {
        let state = self.record(MockCall::InvalidateRenderCaches);
        match &state.render_cache_error {
            Some(message) => Err(HostError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

/// Log sink that keeps every entry for later assertions.
#[derive(Clone, Default)]
pub struct RecordingLogSink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    /// Entries whose message contains `needle`.
    pub fn containing(&self, needle: &str) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.message.contains(needle))
            .cloned()
            .collect()
    }

    /// Entries about one product.
    pub fn about(&self, product_id: ProductId) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.subject_id == Some(product_id))
            .cloned()
            .collect()
    }
}

impl LogSink for RecordingLogSink {
    fn log(&self, entry: LogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_persist_updates_flag_and_records_call() {
        let shop = MockShop::new().with_product(1, 0);
        let record = ProductRecord {
            id: pid(1),
            shop_id: ShopId::DEFAULT,
            active: false,
        };

        assert!(shop.persist(&record).await.unwrap());
        assert_eq!(shop.is_active(1), Some(false));
        assert_eq!(shop.persisted(), vec![record]);
    }

    #[tokio::test]
    async fn test_mock_rejection_leaves_flag_untouched() {
        let shop = MockShop::new().with_product(1, 0).reject_persist(1);
        let record = ProductRecord {
            id: pid(1),
            shop_id: ShopId::DEFAULT,
            active: false,
        };

        assert!(!shop.persist(&record).await.unwrap());
        assert_eq!(shop.is_active(1), Some(true));
    }

    #[tokio::test]
    async fn test_mock_listing_skips_inactive_products() {
        let shop = MockShop::new()
            .with_product(1, 0)
            .with_inactive_product(2, 0)
            .with_product(3, 8);

        let ids = shop.list_active_product_ids(ShopId::DEFAULT).await.unwrap();
        assert_eq!(ids, vec![pid(1), pid(3)]);
        assert_eq!(shop.listing_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_state_is_per_shop() {
        let shop = MockShop::new()
            .with_product(1, 0)
            .with_product_in(1, ShopId(2), 6)
            .with_product_in(2, ShopId(2), 1);

        let stock = shop.total_available_stock(pid(1), ShopId(2)).await.unwrap();
        assert_eq!(stock, StockLevel(6));
        let ids = shop.list_active_product_ids(ShopId::DEFAULT).await.unwrap();
        assert_eq!(ids, vec![pid(1)]);
        let ids = shop.list_active_product_ids(ShopId(2)).await.unwrap();
        assert_eq!(ids, vec![pid(1), pid(2)]);

        let record = ProductRecord {
            id: pid(1),
            shop_id: ShopId(2),
            active: false,
        };
        assert!(shop.persist(&record).await.unwrap());
        assert_eq!(shop.is_active_in(1, ShopId(2)), Some(false));
        assert_eq!(shop.is_active(1), Some(true));
        assert!(shop.load(pid(2), ShopId::DEFAULT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_unknown_product_has_zero_stock() {
        let shop = MockShop::new();
        let stock = shop.total_available_stock(pid(99), ShopId::DEFAULT).await.unwrap();
        assert_eq!(stock, StockLevel(0));
        assert!(shop.load(pid(99), ShopId::DEFAULT).await.unwrap().is_none());
    }

    #[test]
    fn test_recording_sink_filters() {
        let sink = RecordingLogSink::new();
        sink.log(LogEntry::module(Severity::Info, "installed"));
        sink.log(LogEntry::product(Severity::Error, pid(4), "failed"));

        assert_eq!(sink.count(Severity::Info), 1);
        assert_eq!(sink.about(pid(4)).len(), 1);
        assert_eq!(sink.containing("install").len(), 1);
    }
}
