//! Favorites store.
//!
//! Favorites are an id-only set persisted under [`keys::FAVORITES`] as a JSON
//! array (`[1,7,12]`). Products are never stored; listing favorites filters
//! the live catalog with [`FavoritesStore::resolve`].
//!
//! Older clients wrote `{"items":[<product>, ...]}` instead. That shape is
//! still read and is rewritten as a plain id list on load. Anything else that
//! does not parse is treated as an empty set and overwritten.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, warn};

use vitrine_core::{Product, ProductId};

use crate::error::add_breadcrumb;
use crate::notify::{Notice, SharedNotifier};
use crate::storage::{LocalStorage, StorageError, keys};

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFavorites {
    Ids(Vec<ProductId>),
    Products { items: Vec<StoredProduct> },
}

#[derive(Deserialize)]
struct StoredProduct {
    id: ProductId,
}

impl StoredFavorites {
    fn into_ids(self) -> BTreeSet<ProductId> {
        match self {
            Self::Ids(ids) => ids.into_iter().collect(),
            Self::Products { items } => items.into_iter().map(|item| item.id).collect(),
        }
    }
}

/// Persisted set of favorite product ids.
pub struct FavoritesStore<S> {
    ids: BTreeSet<ProductId>,
    storage: S,
    notifier: SharedNotifier,
}

impl<S: LocalStorage> FavoritesStore<S> {
    /// Hydrate favorites from storage, normalizing what is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn load(storage: S, notifier: SharedNotifier) -> Result<Self, StorageError> {
        let ids = match storage.get_item(keys::FAVORITES)? {
            None => BTreeSet::new(),
            Some(raw) => match serde_json::from_str::<StoredFavorites>(&raw) {
                Ok(stored) => stored.into_ids(),
                Err(e) => {
                    warn!(error = %e, "Discarding malformed favorites from storage");
                    BTreeSet::new()
                }
            },
        };

        let store = Self {
            ids,
            storage,
            notifier,
        };
        store.save(&store.ids)?;

        debug!(count = store.ids.len(), "Favorites hydrated");
        Ok(store)
    }

    #[must_use]
    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    /// Favorite ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Mark `id` as favorite. Returns whether it was newly added.
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be persisted.
    pub fn add(&mut self, id: ProductId) -> Result<bool, StorageError> {
        if self.ids.contains(&id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.insert(id);
        self.save(&next)?;
        self.ids = next;
        add_breadcrumb(
            "favorites",
            "Added favorite",
            Some(&[("product_id", id.to_string().as_str())]),
        );
        Ok(true)
    }

    /// Unmark `id`. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be persisted.
    pub fn remove(&mut self, id: ProductId) -> Result<bool, StorageError> {
        if !self.ids.contains(&id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.remove(&id);
        self.save(&next)?;
        self.ids = next;
        add_breadcrumb(
            "favorites",
            "Removed favorite",
            Some(&[("product_id", id.to_string().as_str())]),
        );
        Ok(true)
    }

    /// Flip membership of `id` and return the new membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be persisted.
    pub fn toggle(&mut self, id: ProductId) -> Result<bool, StorageError> {
        let now_favorite = self.flip(id)?;
        let message = if now_favorite {
            "Added to favorites"
        } else {
            "Removed from favorites"
        };
        self.notifier.notify(Notice::success(message));
        Ok(now_favorite)
    }

    /// Like [`FavoritesStore::toggle`], naming the product in the notice.
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be persisted.
    pub fn toggle_product(&mut self, product: &Product) -> Result<bool, StorageError> {
        let now_favorite = self.flip(product.id)?;
        let message = if now_favorite {
            format!("{} added to favorites", product.title)
        } else {
            format!("{} removed from favorites", product.title)
        };
        self.notifier.notify(Notice::success(message));
        Ok(now_favorite)
    }

    /// Remove every favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.save(&BTreeSet::new())?;
        self.ids.clear();
        Ok(())
    }

    /// The favorited products of `catalog`, in catalog order.
    ///
    /// Favorited ids that are no longer in the catalog are skipped.
    #[must_use]
    pub fn resolve(&self, catalog: &[Product]) -> Vec<Product> {
        catalog
            .iter()
            .filter(|product| self.is_favorite(product.id))
            .cloned()
            .collect()
    }

    fn flip(&mut self, id: ProductId) -> Result<bool, StorageError> {
        if self.is_favorite(id) {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id)?;
            Ok(true)
        }
    }

    fn save(&self, ids: &BTreeSet<ProductId>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(ids)?;
        self.storage.set_item(keys::FAVORITES, &raw)
    }
}
