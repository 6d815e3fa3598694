//! Favorites commands.

use vitrine_core::ProductId;
use vitrine_storefront::error::AppError;
use vitrine_storefront::state::AppState;

use crate::output;

pub async fn list(state: &AppState) -> Result<(), AppError> {
    if state.favorites().is_empty() {
        output::info("You have no favorites yet.");
        return Ok(());
    }
    let products = state.favorite_products().await?;
    output::products(state, &products);
    Ok(())
}

pub async fn toggle(state: &mut AppState, id: ProductId) -> Result<(), AppError> {
    state.toggle_favorite(id).await?;
    Ok(())
}

pub fn add(state: &mut AppState, id: ProductId) -> Result<(), AppError> {
    if state.favorites_mut().add(id)? {
        output::info(&format!("Product {id} added to favorites"));
    } else {
        output::info(&format!("Product {id} is already a favorite"));
    }
    Ok(())
}

pub fn remove(state: &mut AppState, id: ProductId) -> Result<(), AppError> {
    if state.favorites_mut().remove(id)? {
        output::info(&format!("Product {id} removed from favorites"));
    } else {
        output::info(&format!("Product {id} is not a favorite"));
    }
    Ok(())
}

pub fn clear(state: &mut AppState) -> Result<(), AppError> {
    state.favorites_mut().clear()?;
    output::info("Favorites cleared");
    Ok(())
}
