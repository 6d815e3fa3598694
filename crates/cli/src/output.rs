//! Terminal rendering.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use vitrine_core::{Category, Product, User};
use vitrine_storefront::filters::{
    CARD_DESCRIPTION_CHARS, CARD_TITLE_CHARS, format_date, truncate_text,
};
use vitrine_storefront::notify::{Notice, NoticeLevel, Notifier};
use vitrine_storefront::state::AppState;

/// Prints notices as they are emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✓ {}", notice.message),
            NoticeLevel::Error => eprintln!("✗ {}", notice.message),
        }
    }
}

pub fn failure(message: &str) {
    eprintln!("Error: {message}");
}

pub fn info(message: &str) {
    println!("{message}");
}

/// Product cards: id, favorite marker, title, price, category and a short
/// description.
pub fn products(state: &AppState, products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }

    for product in products {
        let marker = if state.favorites().is_favorite(product.id) {
            "♥"
        } else {
            " "
        };
        println!(
            "{marker} #{:<5} {:<33} {:>14}  [{}]",
            product.id,
            truncate_text(&product.title, CARD_TITLE_CHARS),
            state.price(product.price).display(),
            product.category.name,
        );
        if !product.description.is_empty() {
            println!(
                "         {}",
                truncate_text(&product.description, CARD_DESCRIPTION_CHARS)
            );
        }
    }
    println!("\n{} product(s)", products.len());
}

pub fn product(state: &AppState, product: &Product) {
    let favorite = if state.favorites().is_favorite(product.id) {
        " ♥"
    } else {
        ""
    };
    println!("{}{favorite}", product.title);
    println!("{}", state.price(product.price).display());
    println!("Category: {}", product.category.name);
    if let Some(line) = state.cart().line(product.id) {
        println!("In cart: {}", line.quantity);
    }
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
    for image in &product.images {
        println!("  {image}");
    }
}

pub fn categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }
    for category in categories {
        println!("#{:<5} {}", category.id, category.name);
    }
}

/// Cart lines followed by the order summary.
pub fn cart(state: &AppState) {
    let cart = state.cart();
    if cart.lines().is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "#{:<5} {:<33} {:>4} x {:>14} = {:>14}",
            line.product_id,
            truncate_text(&line.product.title, CARD_TITLE_CHARS),
            line.quantity,
            state.price(line.product.price).display(),
            line.subtotal()
                .map_or_else(|| "-".to_string(), |subtotal| state.price(subtotal).display()),
        );
    }

    let summary = cart.summary(state.currency());
    let shipping = if summary.free_shipping() {
        "Free".to_string()
    } else {
        summary.shipping.display()
    };
    println!();
    println!("Subtotal ({} items): {:>14}", summary.item_count, summary.subtotal.display());
    println!("Shipping:            {shipping:>14}");
    println!("Taxes:               {:>14}", summary.taxes.display());
    println!("Total:               {:>14}", summary.total.display());
}

/// Account dashboard.
pub fn account(state: &AppState, user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("Role: {}", user.role);
    if let Some(created_at) = &user.created_at {
        println!("Member since: {}", format_date(created_at));
    }
    if !user.avatar.is_empty() {
        println!("Avatar: {}", user.avatar);
    }
    println!();
    println!(
        "Cart: {} item(s), {}",
        state.cart().total_items(),
        state.price(state.cart().total_price()).display()
    );
    println!("Favorites: {}", state.favorites().len());
}
