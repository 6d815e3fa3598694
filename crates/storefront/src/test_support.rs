//! Fixtures shared by unit tests.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;

use vitrine_core::{Category, CategoryId, Product, ProductId};

use crate::storage::{LocalStorage, MemoryStorage, StorageError};

/// Memory storage whose writes can be switched off to simulate a full disk.
#[derive(Debug, Clone, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("disk full").into());
        }
        Ok(())
    }
}

impl LocalStorage for FlakyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.remove_item(key)
    }
}

/// Product `id` priced at `cents` hundredths.
pub fn product(id: i32, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Decimal::new(cents, 2),
        description: format!("Description of product {id}"),
        category: Category {
            id: CategoryId::new(1),
            name: "Clothes".to_string(),
            image: String::new(),
        },
        images: vec![format!("https://img.example/{id}.jpg")],
    }
}
