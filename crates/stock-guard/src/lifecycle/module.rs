use crate::cache::CacheInvalidator;
use crate::config::GuardConfig;
use crate::disabler::ProductDisabler;
use crate::error::GuardError;
use crate::handler::{HandlerOutcome, StockChangeHandler};
use crate::journal::Journal;
use crate::rule::ZeroStockRule;
use crate::scanner::{BulkZeroStockScanner, ScanReport};
use shop_host::{HookRegistry, HostPorts, Severity, ShopId, StockQuantityChanged};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Host context supplied when the module is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallContext {
    pub shop_id: ShopId,
}

impl Default for InstallContext {
    fn default() -> Self {
        Self {
            shop_id: ShopId::DEFAULT,
        }
    }
}

/// Result of [`AutoDisableModule::on_install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// What the host is told. Only a failed hook registration makes this `false`.
    pub installed: bool,
    /// Present when the install scan ran.
    pub scan: Option<ScanReport>,
}

/// The module as the host sees it: three entry points, none of which fail.
///
/// # Wiring
///
/// All collaborators are built once from a [`HostPorts`] bundle:
///
/// ```text
/// ProductDisabler ──► ZeroStockRule ──┬──► StockChangeHandler
///                                      └──► BulkZeroStockScanner ──► CacheInvalidator
/// ```
///
/// The scanner and the invalidator are only wired when the configured
/// [`ModuleVersion`](crate::config::ModuleVersion) has them.
pub struct AutoDisableModule {
    config: GuardConfig,
    hooks: Arc<dyn HookRegistry>,
    handler: StockChangeHandler,
    scanner: Option<BulkZeroStockScanner>,
    journal: Journal,
}

impl AutoDisableModule {
    pub fn new(config: GuardConfig, ports: HostPorts) -> Self {
        let journal = Journal::new(ports.log.clone(), config.module_name.as_str());
        let disabler = ProductDisabler::new(ports.products.clone(), journal.clone());
        let rule = ZeroStockRule::new(ports.stock.clone(), disabler);

        let invalidator = config.invalidate_caches().then(|| {
            CacheInvalidator::new(
                ports.render_cache.clone(),
                config.cache_paths(),
                journal.clone(),
            )
        });
        let scanner = config.scan_on_install().then(|| {
            BulkZeroStockScanner::new(
                ports.catalog.clone(),
                rule.clone(),
                invalidator,
                journal.clone(),
            )
        });

        Self {
            handler: StockChangeHandler::new(rule, journal.clone()),
            hooks: ports.hooks,
            scanner,
            journal,
            config,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Subscribes to the stock hook, then (1.1.0+) hides products already sold out.
    ///
    /// A failed subscription is the only way to fail the install. The scan's own
    /// failures are logged and leave the result untouched.
    #[instrument(skip(self), fields(version = %self.config.version))]
    pub async fn on_install(&self, ctx: InstallContext) -> InstallReport {
        match self.register_hook().await {
            Ok(true) => {}
            Ok(false) => {
                error!(hook = %self.config.hook_name, "Hook registration refused");
                self.journal.module(
                    Severity::Error,
                    format_args!("Installation failed: hook {} was refused", self.config.hook_name),
                );
                return InstallReport {
                    installed: false,
                    scan: None,
                };
            }
            Err(err) => {
                error!(%err, "Install failed");
                self.journal
                    .module(Severity::Error, format_args!("Installation failed: {err}"));
                return InstallReport {
                    installed: false,
                    scan: None,
                };
            }
        }

        self.journal
            .module(Severity::Info, "Module installed successfully");

        let scan = match &self.scanner {
            Some(scanner) => Some(scanner.scan(ctx.shop_id).await),
            None => None,
        };

        info!(shop_id = %ctx.shop_id, "Installed");
        InstallReport {
            installed: true,
            scan,
        }
    }

    async fn register_hook(&self) -> Result<bool, GuardError> {
        self.hooks
            .register_hook(&self.config.hook_name)
            .await
            .map_err(GuardError::HookRegistration)
    }

    /// Logs the uninstall and drops the hook subscription. Always succeeds.
    #[instrument(skip(self))]
    pub async fn on_uninstall(&self) -> bool {
        self.journal.module(Severity::Info, "Module uninstalled");

        if let Err(err) = self.hooks.unregister_hook(&self.config.hook_name).await {
            self.journal.module(
                Severity::Warning,
                format_args!("Failed to unregister hook {}: {err}", self.config.hook_name),
            );
        }
        true
    }

    /// Per-event hook entry point.
    pub async fn on_stock_quantity_changed(&self, event: &StockQuantityChanged) -> HandlerOutcome {
        self.handler.on_stock_quantity_changed(event).await
    }
}
