//! Application state.
//!
//! Every component is built here, once, from [`StorefrontConfig`]. Front ends
//! own an [`AppState`] and pass it where it is needed; nothing is global.

use secrecy::SecretString;
use tracing::info;

use vitrine_core::{CurrencyCode, Price, Product, ProductId, User};

use crate::cart::CartStore;
use crate::catalog::{CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::favorites::FavoritesStore;
use crate::notify::SharedNotifier;
use crate::services::auth::{AuthError, AuthSession};
use crate::storage::{FileStorage, LocalStorage, StorageError};

/// The storefront: catalog client, cart, favorites and auth session sharing
/// one local storage.
pub struct AppState<S = FileStorage> {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: CartStore<S>,
    favorites: FavoritesStore<S>,
    auth: AuthSession<S>,
}

impl AppState<FileStorage> {
    /// Create the state with file storage in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart or favorites cannot be read or
    /// rewritten.
    pub fn new(config: StorefrontConfig, notifier: SharedNotifier) -> Result<Self, StorageError> {
        let storage = FileStorage::new(&config.data_dir);
        Self::with_storage(config, storage, notifier)
    }
}

impl<S: LocalStorage + Clone> AppState<S> {
    /// Create the state over any local storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart or favorites cannot be read or
    /// rewritten.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: S,
        notifier: SharedNotifier,
    ) -> Result<Self, StorageError> {
        let catalog = CatalogClient::new(&config.catalog);
        let cart = CartStore::load(storage.clone(), notifier.clone())?;
        let favorites = FavoritesStore::load(storage.clone(), notifier.clone())?;
        let auth = AuthSession::new(storage, notifier);

        info!(
            api_url = %config.catalog.api_url,
            cart_items = cart.total_items(),
            favorites = favorites.len(),
            "Storefront state ready"
        );

        Ok(Self {
            config,
            catalog,
            cart,
            favorites,
            auth,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    #[must_use]
    pub const fn favorites(&self) -> &FavoritesStore<S> {
        &self.favorites
    }

    pub const fn favorites_mut(&mut self) -> &mut FavoritesStore<S> {
        &mut self.favorites
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthSession<S> {
        &self.auth
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.config.currency
    }

    /// `amount` in the configured display currency.
    #[must_use]
    pub const fn price(&self, amount: rust_decimal::Decimal) -> Price {
        Price::new(amount, self.config.currency)
    }

    /// Fetch `id` from the catalog and add `quantity` units to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown product, or the catalog
    /// or storage error.
    pub async fn add_to_cart(&mut self, id: ProductId, quantity: u32) -> Result<bool, AppError> {
        let product = self.product(id).await?;
        Ok(self.cart.add_item(product, quantity)?)
    }

    /// Fetch `id` from the catalog and flip its favorite flag.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown product, or the catalog
    /// or storage error.
    pub async fn toggle_favorite(&mut self, id: ProductId) -> Result<bool, AppError> {
        let product = self.product(id).await?;
        Ok(self.favorites.toggle_product(&product)?)
    }

    /// Favorited products still present in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be listed.
    pub async fn favorite_products(&self) -> Result<Vec<Product>, CatalogError> {
        let catalog = self.catalog.products().await?;
        Ok(self.favorites.resolve(&catalog))
    }

    /// See [`AuthSession::restore`].
    ///
    /// # Errors
    ///
    /// Returns an error only if local storage fails.
    pub async fn restore_session(&mut self) -> Result<bool, AuthError> {
        self.auth.restore(&self.catalog).await
    }

    /// See [`AuthSession::login`].
    ///
    /// # Errors
    ///
    /// Returns the login failure.
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        self.auth.login(&self.catalog, email, password).await
    }

    /// See [`AuthSession::register`].
    ///
    /// # Errors
    ///
    /// Returns the registration or follow-up login failure.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        self.auth
            .register(&self.catalog, name, email, password)
            .await
    }

    /// See [`AuthSession::logout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be removed.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.auth.logout()
    }

    async fn product(&self, id: ProductId) -> Result<Product, AppError> {
        self.catalog.product(id).await.map_err(|e| match e {
            CatalogError::NotFound(_) => AppError::NotFound(format!("Product {id}")),
            other => AppError::Catalog(other),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notify::NoticeLog;
    use crate::storage::{MemoryStorage, keys};

    #[test]
    fn test_components_share_storage() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::FAVORITES, "[3,1]").unwrap();

        let mut state = AppState::with_storage(
            StorefrontConfig::default(),
            storage.clone(),
            Arc::new(NoticeLog::new()),
        )
        .unwrap();

        assert!(state.favorites().is_favorite(ProductId::new(3)));
        assert!(state.cart().lines().is_empty());
        assert!(storage.get_item(keys::CART).unwrap().is_some());

        state.favorites_mut().toggle(ProductId::new(3)).unwrap();
        assert_eq!(storage.get_item(keys::FAVORITES).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_price_uses_configured_currency() {
        let config = StorefrontConfig {
            currency: CurrencyCode::USD,
            ..StorefrontConfig::default()
        };
        let state =
            AppState::with_storage(config, MemoryStorage::new(), Arc::new(NoticeLog::new()))
                .unwrap();
        assert_eq!(
            state.price(rust_decimal::Decimal::new(123_456, 2)).display(),
            "$1,234.56"
        );
    }
}
