//! Session-backed shopping cart.
//!
//! A [`Cart`] persists its line items through a pluggable
//! [`trolley_store::SessionStore`]; every operation is a fresh
//! read-modify-write cycle against the backend. Items are keyed
//! collections of scalar fields, quantities update as relative deltas,
//! and totals run through a config-driven value formatter.
//!
//! # Example
//!
//! ```rust,ignore
//! use trolley_cart::prelude::*;
//! use trolley_store::MemoryStore;
//!
//! let mut cart = Cart::new(
//!     MemoryStore::new(),
//!     "shopping",
//!     "SAMPLESESSIONKEY",
//!     CartConfig::default(),
//! );
//!
//! // Add an item
//! cart.add(ItemInput::new(455, "Sample Item", 100.99, 2))?;
//!
//! // Quantities update relatively: this brings 2 up to 3
//! cart.update(455, [("quantity", FieldValue::from("+1"))])?;
//!
//! // Aggregate
//! println!("total: {}", cart.total()?);
//! ```

pub mod cart;
pub mod collection;
pub mod config;
pub mod error;
pub mod format;
pub mod value;

pub use cart::{AddRequest, Cart, CartCollection, Item, ItemInput, ModelResolver, NoModels};
pub use collection::{Key, KeyedCollection};
pub use config::CartConfig;
pub use error::CartError;
pub use format::{format_value, normalize_price, Amount};
pub use value::FieldValue;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{AddRequest, Cart, CartCollection, Item, ItemInput, ModelResolver, NoModels};
    pub use crate::collection::{Key, KeyedCollection};
    pub use crate::config::CartConfig;
    pub use crate::error::CartError;
    pub use crate::format::Amount;
    pub use crate::value::FieldValue;
}
