//! Integration tests for the catalog client against the fake catalog.

use axum::http::StatusCode;
use rust_decimal::Decimal;

use vitrine_core::{CategoryId, ProductId};
use vitrine_integration_tests::{FakeCatalog, PRODUCT_COUNT};
use vitrine_storefront::catalog::{CatalogClient, CatalogError, FEATURED_COUNT, ProductFilter};
use vitrine_storefront::config::StorefrontConfig;

async fn fake() -> FakeCatalog {
    FakeCatalog::start().await.expect("Failed to start fake catalog")
}

// ============================================================================
// Listing & Lookup
// ============================================================================

#[tokio::test]
async fn test_lists_products_in_catalog_order() {
    let catalog = fake().await;
    let products = catalog
        .client()
        .products()
        .await
        .expect("Failed to list products");

    assert_eq!(products.len(), PRODUCT_COUNT);
    assert_eq!(products[0].id, ProductId::new(1));
    assert_eq!(products[0].title, "Classic Red Pullover Hoodie");
    assert_eq!(products[0].price, Decimal::from(10));
    assert_eq!(products[0].category.name, "Clothes");
}

#[tokio::test]
async fn test_double_encoded_images_are_cleaned() {
    let catalog = fake().await;
    let product = catalog
        .client()
        .product(ProductId::new(3))
        .await
        .expect("Failed to get product");

    assert_eq!(
        product.images,
        vec!["https://i.imgur.com/a.jpeg", "https://i.imgur.com/b.jpeg"]
    );
    assert_eq!(product.thumbnail(), Some("https://i.imgur.com/a.jpeg"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let catalog = fake().await;
    let err = catalog
        .client()
        .product(ProductId::new(999))
        .await
        .expect_err("Product 999 should not exist");

    assert!(matches!(err, CatalogError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_categories_and_category_products() {
    let catalog = fake().await;
    let client = catalog.client();

    let categories = client.categories().await.expect("Failed to list categories");
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Clothes", "Electronics", "Furniture"]);

    let furniture = client
        .products_by_category(CategoryId::new(3))
        .await
        .expect("Failed to list category products");
    let ids: Vec<i32> = furniture.iter().map(|p| p.id.as_i32()).collect();
    assert_eq!(ids, vec![6, 9, 10]);
}

#[tokio::test]
async fn test_featured_products_are_the_first_eight() {
    let catalog = fake().await;
    let featured = catalog
        .client()
        .featured_products()
        .await
        .expect("Failed to get featured products");

    assert_eq!(featured.len(), FEATURED_COUNT);
    assert_eq!(featured.last().map(|p| p.id), Some(ProductId::new(8)));
}

#[tokio::test]
async fn test_filter_over_fetched_catalog() {
    let catalog = fake().await;
    let products = catalog.client().products().await.expect("Failed to list products");

    // The sofa is above the default price ceiling
    let all = ProductFilter::new().apply(&products);
    assert_eq!(all.len(), PRODUCT_COUNT - 1);

    let hoodies = ProductFilter::new()
        .with_search("hoodie")
        .with_category(CategoryId::new(1))
        .apply(&products);
    let ids: Vec<i32> = hoodies.iter().map(|p| p.id.as_i32()).collect();
    assert_eq!(ids, vec![1, 2]);
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn test_get_responses_are_cached() {
    let catalog = fake().await;
    let client = catalog.client();

    client.products().await.expect("first fetch");
    client.products().await.expect("second fetch");
    client.featured_products().await.expect("featured fetch");
    assert_eq!(catalog.hits("/products"), 1);

    client.product(ProductId::new(2)).await.expect("first lookup");
    client.product(ProductId::new(2)).await.expect("second lookup");
    assert_eq!(catalog.hits("/products/2"), 1);

    // Clones share the cache
    client.clone().categories().await.expect("first categories");
    client.categories().await.expect("second categories");
    assert_eq!(catalog.hits("/categories"), 1);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let catalog = fake().await;
    let client = catalog.client();

    catalog.fail_with(StatusCode::SERVICE_UNAVAILABLE);
    client.products().await.expect_err("catalog is down");

    catalog.recover();
    let products = client.products().await.expect("catalog is back");
    assert_eq!(products.len(), PRODUCT_COUNT);
    assert_eq!(catalog.hits("/products"), 2);
}

// ============================================================================
// Error Mapping
// ============================================================================

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let catalog = fake().await;
    catalog.fail_with(StatusCode::INTERNAL_SERVER_ERROR);

    let err = catalog
        .client()
        .categories()
        .await
        .expect_err("catalog is failing");

    match err {
        CatalogError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("Simulated failure"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_404_maps_to_not_found() {
    let catalog = fake().await;
    catalog.fail_with(StatusCode::NOT_FOUND);

    let err = catalog.client().products().await.expect_err("404");
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_http_error() {
    // Reserve a port, then free it so nothing is listening there
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("Failed to reserve a port");

    let mut config = StorefrontConfig::default();
    config.catalog.api_url = format!("http://{addr}/api/v1")
        .parse()
        .expect("valid URL");

    let err = CatalogClient::new(&config.catalog)
        .products()
        .await
        .expect_err("nothing is listening");
    assert!(matches!(err, CatalogError::Http(_)), "got {err:?}");
}
