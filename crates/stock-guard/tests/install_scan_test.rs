use shop_host::mock::{pid, MockCall, MockShop, RecordingLogSink};
use shop_host::{CatalogListing, SeedProduct, Severity, ShopId};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use stock_guard::{AutoDisableModule, GuardConfig, GuardedShop, InstallContext, ModuleVersion};

fn seed_cache(root: &Path) {
    fs::create_dir_all(root.join("smarty/cache")).unwrap();
    fs::create_dir_all(root.join("smarty/compile")).unwrap();
    fs::write(root.join("class_index.php"), "<?php return [];").unwrap();
    fs::write(root.join("smarty/cache/home.html"), "cached").unwrap();
    fs::write(root.join("smarty/compile/product.tpl.php"), "compiled").unwrap();
}

fn catalog() -> Vec<SeedProduct> {
    vec![
        SeedProduct::simple(pid(1), ShopId::DEFAULT, "In stock", 4),
        SeedProduct::simple(pid(2), ShopId::DEFAULT, "Sold out", 0),
        SeedProduct::simple(pid(3), ShopId::DEFAULT, "Oversold", -1),
        SeedProduct::simple(pid(4), ShopId::DEFAULT, "Hidden", 0).inactive(),
    ]
}

#[tokio::test]
async fn test_install_scan_hides_sold_out_products_and_clears_caches() {
    let tmp = tempfile::tempdir().unwrap();
    seed_cache(tmp.path());
    let log = RecordingLogSink::new();
    let config = GuardConfig::default().with_cache_dir(tmp.path());
    let system = GuardedShop::start(config, Arc::new(log.clone()));
    system.seed(catalog()).await.unwrap();

    let report = system.install(ShopId::DEFAULT).await;

    assert!(report.installed);
    let scan = report.scan.expect("scan ran");
    assert_eq!((scan.scanned, scan.disabled), (3, 2));
    let cache = scan.cache.expect("caches cleared");
    assert!(cache.is_clean());
    assert_eq!(cache.removed_entries, 2);

    let active = system
        .shop
        .list_active_product_ids(ShopId::DEFAULT)
        .await
        .unwrap();
    assert_eq!(active, vec![pid(1)]);
    assert_eq!(system.shop.render_cache_invalidations().await.unwrap(), 1);
    assert!(!tmp.path().join("class_index.php").exists());
    assert!(tmp.path().join("smarty/cache").is_dir());
    assert_eq!(fs::read_dir(tmp.path().join("smarty/cache")).unwrap().count(), 0);

    let messages: Vec<String> = log.entries().into_iter().map(|entry| entry.message).collect();
    let position = |needle: &str| {
        messages
            .iter()
            .position(|message| message.contains(needle))
            .unwrap_or_else(|| panic!("missing log: {needle}"))
    };
    assert!(position("Module installed successfully") < position("Product ID 2 disabled"));
    assert!(position("Initial scan completed: 3 products checked, 2 disabled") < position("Cache cleared"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_scan_release_leaves_caches_alone() {
    let tmp = tempfile::tempdir().unwrap();
    seed_cache(tmp.path());
    let log = RecordingLogSink::new();
    let config = GuardConfig::default()
        .with_version(ModuleVersion::V1_1_0)
        .with_cache_dir(tmp.path());
    let system = GuardedShop::start(config, Arc::new(log.clone()));
    system.seed(catalog()).await.unwrap();

    let report = system.install(ShopId::DEFAULT).await;

    assert_eq!(report.scan.map(|scan| scan.disabled), Some(2));
    assert!(tmp.path().join("class_index.php").exists());
    assert_eq!(system.shop.render_cache_invalidations().await.unwrap(), 0);
    assert!(log.containing("Cache").is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_first_release_installs_hook_only() {
    let log = RecordingLogSink::new();
    let config = GuardConfig::default().with_version(ModuleVersion::V1_0_0);
    let system = GuardedShop::start(config, Arc::new(log.clone()));
    system.seed(catalog()).await.unwrap();

    let report = system.install(ShopId::DEFAULT).await;

    assert!(report.installed);
    assert!(report.scan.is_none());
    let active = system
        .shop
        .list_active_product_ids(ShopId::DEFAULT)
        .await
        .unwrap();
    assert_eq!(active, vec![pid(1), pid(2), pid(3)]);
    assert_eq!(log.entries().len(), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_listing_failure_does_not_fail_install() {
    let shop = MockShop::new()
        .with_product(1, 0)
        .fail_listing("Lost connection to MySQL server");
    let log = RecordingLogSink::new();
    let module = AutoDisableModule::new(GuardConfig::default(), shop.ports(&log));

    let report = module.on_install(InstallContext::default()).await;

    assert!(report.installed);
    assert!(report.scan.as_ref().is_some_and(|scan| scan.aborted));
    assert_eq!(shop.is_active(1), Some(true));
    assert_eq!(shop.render_cache_calls(), 0);
    let errors: Vec<_> = log
        .entries()
        .into_iter()
        .filter(|entry| entry.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].subject_id, None);
    assert!(errors[0].message.contains("Lost connection to MySQL server"));
}

#[tokio::test]
async fn test_uninstall_unregisters_hook() {
    let shop = MockShop::new();
    let log = RecordingLogSink::new();
    let module = AutoDisableModule::new(GuardConfig::default(), shop.ports(&log));

    assert!(module.on_uninstall().await);

    assert_eq!(
        shop.calls(),
        vec![MockCall::UnregisterHook("actionUpdateQuantity".to_string())]
    );
    assert_eq!(log.containing("Module uninstalled").len(), 1);
}

#[tokio::test]
async fn test_host_without_render_cache_still_clears_files() {
    let tmp = tempfile::tempdir().unwrap();
    seed_cache(tmp.path());
    let shop = MockShop::new().with_product(1, 0);
    let log = RecordingLogSink::new();
    let module = AutoDisableModule::new(
        GuardConfig::default().with_cache_dir(tmp.path()),
        shop.ports(&log).without_render_cache(),
    );

    let report = module.on_install(InstallContext::default()).await;

    let cache = report.scan.and_then(|scan| scan.cache).expect("caches cleared");
    assert!(cache.is_clean());
    assert!(!cache.cleared.iter().any(|target| target == "render caches"));
    assert_eq!(shop.render_cache_calls(), 0);
    assert!(!tmp.path().join("class_index.php").exists());
    assert_eq!(fs::read_dir(tmp.path().join("smarty/cache")).unwrap().count(), 0);
}
