//! Read-only entities served by the catalog service.
//!
//! Field names follow the service's JSON (`creationAt`, `images`, ...). The
//! same shapes are used for the snapshots persisted inside the cart, so a
//! product serialized here must deserialize back unchanged.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{CategoryId, ProductId, UserId, UserRole};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Cover image URL.
    #[serde(default)]
    pub image: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price, carried as a JSON number on the wire.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    /// Image URLs in display order. May be empty.
    #[serde(default, deserialize_with = "deserialize_images")]
    pub images: Vec<String>,
}

impl Product {
    /// First image, used as the thumbnail in listings.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Subtotal for `quantity` units of this product, or `None` if it does
    /// not fit in a `Decimal`.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(quantity))
    }
}

/// A user profile as returned by `/auth/profile` and `/users`.
///
/// The service echoes the password back. It has no field here and is dropped
/// on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, rename = "creationAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The catalog sometimes stores image lists that were JSON-encoded twice,
/// producing entries like `["https://i.imgur.com/a.jpeg"` or `"https://..."]`.
/// Strip the stray brackets and quotes and drop entries that end up empty.
fn deserialize_images<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .iter()
        .map(String::as_str)
        .map(clean_image_url)
        .filter(|url| !url.is_empty())
        .collect())
}

fn clean_image_url(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '[' || c == ']' || c == '"' || c == '\\')
        .trim()
        .to_string()
}
