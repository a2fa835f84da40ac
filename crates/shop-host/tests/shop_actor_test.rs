use shop_host::mock::pid;
use shop_host::{
    CatalogListing, HookRegistry, HostError, ProductStore, RenderCache, SeedProduct, ShopActor,
    ShopId, StockLevel, StockReader,
};

/// End-to-end run of the in-memory host with a real actor task.
#[tokio::test]
async fn test_shop_actor_serves_every_port() {
    let (actor, shop) = ShopActor::new(16);
    let handle = tokio::spawn(actor.run());

    shop.add_product(
        SeedProduct::simple(pid(1), ShopId::DEFAULT, "T-Shirt", 0)
            .with_combination(11, 2)
            .with_combination(12, 3),
    )
    .await
    .expect("Failed to add product");
    shop.add_product(SeedProduct::simple(pid(2), ShopId::DEFAULT, "Mug", 4).inactive())
        .await
        .expect("Failed to add product");
    shop.add_product(SeedProduct::simple(pid(3), ShopId(2), "Poster", 0))
        .await
        .expect("Failed to add product");

    // Stock is summed across combinations
    let stock = shop.total_available_stock(pid(1), ShopId::DEFAULT).await.unwrap();
    assert_eq!(stock, StockLevel(5));

    // Unknown products report zero instead of failing
    let stock = shop.total_available_stock(pid(42), ShopId::DEFAULT).await.unwrap();
    assert_eq!(stock, StockLevel(0));

    // Listing is scoped to the shop and skips inactive products
    let active = shop.list_active_product_ids(ShopId::DEFAULT).await.unwrap();
    assert_eq!(active, vec![pid(1)]);
    let active = shop.list_active_product_ids(ShopId(2)).await.unwrap();
    assert_eq!(active, vec![pid(3)]);

    // Load / mutate / persist
    let mut record = shop
        .load(pid(1), ShopId::DEFAULT)
        .await
        .unwrap()
        .expect("Product not found");
    assert!(record.active);
    shop.set_active(&mut record, false);
    assert!(shop.persist(&record).await.unwrap());
    let reloaded = shop.load(pid(1), ShopId::DEFAULT).await.unwrap().unwrap();
    assert!(!reloaded.active);

    // Product 3 lives in shop 2 only
    assert!(shop.load(pid(3), ShopId::DEFAULT).await.unwrap().is_none());

    shop.invalidate_render_caches().await.unwrap();
    assert_eq!(shop.render_cache_invalidations().await.unwrap(), 1);

    drop(shop);
    handle.await.expect("Shop actor panicked");
}

#[tokio::test]
async fn test_stock_updates_dispatch_only_when_hook_registered() {
    let (actor, shop) = ShopActor::new(16);
    tokio::spawn(actor.run());

    shop.add_product(SeedProduct::simple(pid(5), ShopId::DEFAULT, "Lamp", 2))
        .await
        .unwrap();

    let event = shop.set_quantity(pid(5), ShopId::DEFAULT, 0, 1).await.unwrap();
    assert!(event.is_none(), "No hook subscribed yet");

    assert!(shop.register_hook("actionUpdateQuantity").await.unwrap());
    let event = shop
        .set_quantity(pid(5), ShopId::DEFAULT, 0, 0)
        .await
        .unwrap()
        .expect("Hook should be dispatched");
    assert_eq!(event.product_id, Some(5));
    assert_eq!(event.combination(), 0);
    assert_eq!(event.shop_id, ShopId::DEFAULT);

    assert!(shop.unregister_hook("actionUpdateQuantity").await.unwrap());
    let event = shop.set_quantity(pid(5), ShopId::DEFAULT, 0, 3).await.unwrap();
    assert!(event.is_none());
}

#[tokio::test]
async fn test_duplicate_and_unknown_products_are_rejected() {
    let (actor, shop) = ShopActor::new(16);
    tokio::spawn(actor.run());

    let seed = SeedProduct::simple(pid(8), ShopId::DEFAULT, "Chair", 1);
    shop.add_product(seed.clone()).await.unwrap();
    assert!(shop.add_product(seed).await.is_err());

    assert!(shop.set_quantity(pid(9), ShopId::DEFAULT, 0, 1).await.is_err());
}

#[tokio::test]
async fn test_custom_stock_hook_is_dispatched() {
    let (actor, shop) = ShopActor::with_stock_hook(16, "actionStockGuardUpdate");
    tokio::spawn(actor.run());
    shop.add_product(SeedProduct::simple(pid(4), ShopId::DEFAULT, "Vase", 1))
        .await
        .unwrap();

    // The default hook name no longer triggers dispatch
    shop.register_hook("actionUpdateQuantity").await.unwrap();
    assert!(shop.set_quantity(pid(4), ShopId::DEFAULT, 0, 2).await.unwrap().is_none());

    shop.register_hook("actionStockGuardUpdate").await.unwrap();
    let event = shop.set_quantity(pid(4), ShopId::DEFAULT, 0, 0).await.unwrap();
    assert_eq!(event.and_then(|event| event.product_id), Some(4));
}

#[tokio::test]
async fn test_overflowing_stock_total_is_an_error_not_a_crash() {
    let (actor, shop) = ShopActor::new(16);
    let handle = tokio::spawn(actor.run());
    shop.add_product(
        SeedProduct::simple(pid(6), ShopId::DEFAULT, "Bolt", 0)
            .with_combination(1, i64::MAX)
            .with_combination(2, 1),
    )
    .await
    .unwrap();

    let result = shop.total_available_stock(pid(6), ShopId::DEFAULT).await;
    assert!(matches!(result, Err(HostError::Query(_))), "got {result:?}");

    // Updating a row while the total overflows keeps the actor alive too
    shop.set_quantity(pid(6), ShopId::DEFAULT, 2, 5).await.unwrap();

    // Actor is still serving requests
    shop.set_quantity(pid(6), ShopId::DEFAULT, 1, 10).await.unwrap();
    let stock = shop.total_available_stock(pid(6), ShopId::DEFAULT).await.unwrap();
    assert_eq!(stock, StockLevel(15));

    drop(shop);
    handle.await.expect("Shop actor panicked");
}
