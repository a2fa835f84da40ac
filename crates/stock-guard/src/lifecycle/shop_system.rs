use super::module::{AutoDisableModule, InstallContext, InstallReport};
use crate::config::GuardConfig;
use crate::handler::HandlerOutcome;
use shop_host::{
    CombinationId, HostError, HostPorts, LogSink, ProductId, SeedProduct, ShopActor, ShopClient,
    ShopId,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const SHOP_BUFFER: usize = 64;

/// An in-memory shop with the module attached.
///
/// Quantity updates go through [`GuardedShop::update_quantity`], which forwards the host's
/// hook event to the module the way a real dispatcher would.
pub struct GuardedShop {
    pub shop: ShopClient,
    pub module: AutoDisableModule,
    handle: JoinHandle<()>,
}

impl GuardedShop {
    /// Spawns the shop actor and builds the module on top of it. Nothing is installed yet.
    ///
    /// The shop fires the module's configured hook on every quantity update.
    pub fn start(config: GuardConfig, log: Arc<dyn LogSink>) -> Self {
        let (actor, shop) = ShopActor::with_stock_hook(SHOP_BUFFER, config.hook_name.clone());
        let handle = tokio::spawn(actor.run());
        let module = AutoDisableModule::new(config, HostPorts::from_host(shop.clone(), log));
        Self {
            shop,
            module,
            handle,
        }
    }

    pub async fn seed(&self, products: impl IntoIterator<Item = SeedProduct>) -> Result<(), HostError> {
        for product in products {
            self.shop.add_product(product).await?;
        }
        Ok(())
    }

    pub async fn install(&self, shop_id: ShopId) -> InstallReport {
        self.module.on_install(InstallContext { shop_id }).await
    }

    /// Sets one combination's quantity. Returns the module's outcome when the hook fired.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
        combination: CombinationId,
        quantity: i64,
    ) -> Result<Option<HandlerOutcome>, HostError> {
        let event = self
            .shop
            .set_quantity(product_id, shop_id, combination, quantity)
            .await?;
        match event {
            Some(event) => Ok(Some(self.module.on_stock_quantity_changed(&event).await)),
            None => {
                debug!(%product_id, hook = %self.module.config().hook_name, "Hook not subscribed");
                Ok(None)
            }
        }
    }

    /// Drops every client, including the ones held by the module's ports, then waits for the actor.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down shop");
        drop(self.module);
        drop(self.shop);
        self.handle.await.map_err(|e| e.to_string())
    }
}
