//! Shopping cart module.
//!
//! Contains the cart itself, its line items, and the add-request input
//! types.

mod cart;
mod item;

pub use cart::{AddRequest, Cart, CartCollection, ItemInput};
pub use item::{Item, ModelResolver, NoModels};
