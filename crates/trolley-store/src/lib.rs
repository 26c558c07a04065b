//! Pluggable key/value session storage for Trolley carts.
//!
//! A cart persists its line items through a [`SessionStore`]: a small
//! key/value contract with automatic JSON serialization. The backend is
//! injected by the caller and may be shared between carts.
//!
//! # Example
//!
//! ```rust,ignore
//! use trolley_store::{MemoryStore, SessionStore};
//!
//! let store = MemoryStore::new();
//!
//! // Store a value
//! store.put("checkout_cart_items", &items)?;
//!
//! // Retrieve a value
//! let items: Option<Items> = store.get("checkout_cart_items")?;
//!
//! // Delete a value
//! store.delete("checkout_cart_items")?;
//! ```

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::SessionStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{MemoryStore, SessionStore, StoreError};
}
