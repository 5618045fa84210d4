//! Key-value persistence substrate.
//!
//! The store holds raw strings under string keys and survives restarts. It
//! gives no transactional or concurrent-access guarantees: two processes
//! sharing one store can overwrite each other's values.
//!
//! Two keys are used, each holding a JSON array:
//!
//! - [`PRODUCTS_KEY`] - the catalog snapshot taken after the last fetch
//! - [`CART_KEY`] - the cart lines
//!
//! # Implementations
//!
//! - [`MemoryStorage`] - `HashMap`-backed, for tests
//! - [`FileStorage`] - one file per key in a directory

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use comfy_house_core::Product;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage key of the catalog snapshot.
pub const PRODUCTS_KEY: &str = "products";

/// Storage key of the cart.
pub const CART_KEY: &str = "cart";

/// Errors raised by a storage backend or by (de)serializing stored values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized before writing.
    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value is not valid JSON of the expected shape.
    #[error("stored value for key '{key}' is corrupted: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string key-value store.
pub trait Storage {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read and deserialize a JSON value.
///
/// # Errors
///
/// Returns `StorageError::Corrupt` if the stored text does not parse as `T`.
pub fn load_json<T, S>(storage: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: Storage + ?Sized,
{
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
}

/// Serialize a value as JSON and store it.
///
/// # Errors
///
/// Returns `StorageError::Serialize` if the value cannot be serialized, or
/// the backend's error if the write fails.
pub fn save_json<T, S>(storage: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: Storage + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    storage.set(key, &raw)
}

/// Persist the catalog snapshot.
///
/// # Errors
///
/// Propagates serialization and backend errors.
pub fn save_products<S: Storage + ?Sized>(
    storage: &mut S,
    products: &[Product],
) -> Result<(), StorageError> {
    save_json(storage, PRODUCTS_KEY, products)
}

/// Load the catalog snapshot, or an empty list if none was saved.
///
/// # Errors
///
/// Propagates backend errors and `StorageError::Corrupt`.
pub fn load_products<S: Storage + ?Sized>(storage: &S) -> Result<Vec<Product>, StorageError> {
    Ok(load_json(storage, PRODUCTS_KEY)?.unwrap_or_default())
}
