//! Catalog browsing commands.

use rust_decimal::Decimal;

use vitrine_core::{CategoryId, ProductId};
use vitrine_storefront::catalog::{CatalogError, ProductFilter};
use vitrine_storefront::error::AppError;
use vitrine_storefront::state::AppState;

use crate::output;

/// List products matching the given filters.
pub async fn products(
    state: &AppState,
    category: Option<CategoryId>,
    search: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
) -> Result<(), AppError> {
    let mut filter = ProductFilter::new();
    filter.category = category;
    if let Some(search) = search {
        filter.search = search;
    }
    if let Some(min) = min_price {
        filter.min_price = min;
    }
    if let Some(max) = max_price {
        filter.max_price = max;
    }
    if filter.min_price > filter.max_price {
        return Err(AppError::BadRequest(
            "--min-price cannot exceed --max-price".to_string(),
        ));
    }

    let all = state.catalog().products().await?;
    output::products(state, &filter.apply(&all));
    Ok(())
}

pub async fn product(state: &AppState, id: ProductId) -> Result<(), AppError> {
    let product = state.catalog().product(id).await.map_err(|e| match e {
        CatalogError::NotFound(_) => AppError::NotFound(format!("Product {id}")),
        other => other.into(),
    })?;
    output::product(state, &product);
    Ok(())
}

pub async fn featured(state: &AppState) -> Result<(), AppError> {
    let products = state.catalog().featured_products().await?;
    output::products(state, &products);
    Ok(())
}

pub async fn categories(state: &AppState) -> Result<(), AppError> {
    let categories = state.catalog().categories().await?;
    output::categories(&categories);
    Ok(())
}

pub async fn category(state: &AppState, id: CategoryId) -> Result<(), AppError> {
    let products = state.catalog().products_by_category(id).await?;
    output::products(state, &products);
    Ok(())
}
