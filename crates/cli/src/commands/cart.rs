//! Cart commands.

use vitrine_core::ProductId;
use vitrine_storefront::error::AppError;
use vitrine_storefront::state::AppState;
use vitrine_storefront::storage::LocalStorage;

use crate::output;

pub fn show(state: &AppState) {
    output::cart(state);
}

pub async fn add(state: &mut AppState, id: ProductId, quantity: u32) -> Result<(), AppError> {
    if quantity == 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }
    state.add_to_cart(id, quantity).await?;
    Ok(())
}

pub fn remove(state: &mut AppState, id: ProductId) -> Result<(), AppError> {
    if !state.cart_mut().remove_item(id)? {
        output::info(&format!("Product {id} is not in the cart"));
    }
    Ok(())
}

pub fn set(state: &mut AppState, id: ProductId, quantity: u32) -> Result<(), AppError> {
    if let Some(message) = set_quantity(state, id, quantity)? {
        output::info(&message);
    }
    Ok(())
}

/// Apply `cart set` and return the line to print, if any.
fn set_quantity<S: LocalStorage + Clone>(
    state: &mut AppState<S>,
    id: ProductId,
    quantity: u32,
) -> Result<Option<String>, AppError> {
    let Some(previous) = state.cart().line(id).map(|line| line.quantity) else {
        return Ok(Some(format!("Product {id} is not in the cart")));
    };
    let changed = state.cart_mut().update_quantity(id, quantity)?;
    if quantity == 0 {
        return Ok(None);
    }
    if changed || previous == quantity {
        Ok(Some(format!("Quantity of product {id} set to {quantity}")))
    } else {
        Ok(Some(format!("Quantity of product {id} left at {previous}")))
    }
}

pub fn increment(state: &mut AppState, id: ProductId) -> Result<(), AppError> {
    if !state.cart_mut().increment(id)? {
        output::info(&format!("Product {id} is not in the cart"));
        return Ok(());
    }
    print_quantity(state, id);
    Ok(())
}

pub fn decrement(state: &mut AppState, id: ProductId) -> Result<(), AppError> {
    if !state.cart_mut().decrement(id)? {
        output::info(&format!("Product {id} is not in the cart"));
        return Ok(());
    }
    print_quantity(state, id);
    Ok(())
}

pub fn clear(state: &mut AppState) -> Result<(), AppError> {
    state.cart_mut().clear()?;
    Ok(())
}

fn print_quantity(state: &AppState, id: ProductId) {
    if let Some(line) = state.cart().line(id) {
        output::info(&format!("Product {id}: {} in cart", line.quantity));
    }
}
