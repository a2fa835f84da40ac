//! # Module Lifecycle
//!
//! The host drives the module through three entry points: install, uninstall and the
//! stock-quantity-change hook. [`AutoDisableModule`] wires the rule, the scanner and the
//! cache invalidator according to the configured release and exposes those entry points.
//!
//! [`GuardedShop`] runs the module against the in-memory [`ShopActor`](shop_host::ShopActor):
//!
//! 1. **Start** - spawn the shop actor and build the module over a [`ShopClient`](shop_host::ShopClient)
//! 2. **Install** - register the hook, scan, clear caches
//! 3. **Dispatch** - every quantity update that fires the hook is forwarded to the module
//! 4. **Shutdown** - drop every client so the actor's channel closes, then await the task
//!
//! The module holds clones of the shop client inside its ports, so it must be dropped
//! along with the shop handle or the actor never sees its channel close.

pub mod module;
pub mod shop_system;

pub use module::{AutoDisableModule, InstallContext, InstallReport};
pub use shop_system::GuardedShop;
