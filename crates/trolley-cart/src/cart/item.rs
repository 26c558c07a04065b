//! Cart line items.

use crate::collection::{Key, KeyedCollection};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::format::{self, Amount};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};

/// Produces a domain model from a stored reference descriptor.
///
/// Items carry an opaque `associatedModel` descriptor; resolving it into
/// a live object is a capability the caller supplies, not data logic.
pub trait ModelResolver {
    /// The model type produced by this resolver.
    type Model;

    /// Instantiate a default model for the given descriptor.
    fn instantiate(&self, reference: &FieldValue) -> Result<Self::Model, CartError>;
}

/// Resolver for callers that never hydrate associated models.
///
/// Any attempt to resolve through it fails with
/// [`CartError::Instantiation`]; items without an `associatedModel`
/// field never reach it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModels;

impl ModelResolver for NoModels {
    type Model = ();

    fn instantiate(&self, reference: &FieldValue) -> Result<(), CartError> {
        Err(CartError::Instantiation(reference.to_string()))
    }
}

/// A single cart line: a keyed collection of scalar fields plus the
/// formatting configuration.
///
/// Serializes as its field mapping alone; the cart re-injects the
/// configuration when rehydrating from the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    fields: KeyedCollection<FieldValue>,
    #[serde(skip)]
    config: CartConfig,
}

impl Item {
    /// Create an item from a field mapping and a formatting config.
    pub fn new(fields: KeyedCollection<FieldValue>, config: CartConfig) -> Self {
        Self { fields, config }
    }

    /// Re-attach a formatting config, e.g. after deserialization.
    pub fn with_config(mut self, config: CartConfig) -> Self {
        self.config = config;
        self
    }

    /// Access a field by name. Unknown names yield `None`, not an error.
    ///
    /// The virtual `model` field is not stored here; it resolves lazily
    /// through [`Item::model`].
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(&Key::from(name))
    }

    /// Set a field, overwriting any existing value.
    pub fn set(&mut self, name: impl Into<Key>, value: FieldValue) {
        self.fields.put(name, value);
    }

    /// The underlying field collection.
    pub fn fields(&self) -> &KeyedCollection<FieldValue> {
        &self.fields
    }

    /// The item id.
    pub fn id(&self) -> Option<&FieldValue> {
        self.field("id")
    }

    /// The item name.
    pub fn name(&self) -> Option<&str> {
        self.field("name").and_then(FieldValue::as_str)
    }

    /// The unit price; 0.0 when absent or non-numeric.
    pub fn price(&self) -> f64 {
        match self.field("price") {
            Some(FieldValue::Float(price)) => *price,
            Some(FieldValue::Int(price)) => *price as f64,
            Some(FieldValue::Str(raw)) => raw.parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// The quantity; 0 when absent or non-numeric.
    pub fn quantity(&self) -> i64 {
        match self.field("quantity") {
            Some(FieldValue::Int(quantity)) => *quantity,
            Some(FieldValue::Float(quantity)) => *quantity as i64,
            Some(FieldValue::Str(raw)) => raw.parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// The stored associated-model descriptor, if any.
    pub fn associated_model(&self) -> Option<&FieldValue> {
        self.field("associatedModel")
    }

    /// Resolve the associated model through the given resolver.
    ///
    /// `Ok(None)` when the item has no `associatedModel` field; a
    /// descriptor the resolver cannot instantiate surfaces as
    /// [`CartError::Instantiation`].
    pub fn model<R: ModelResolver>(&self, resolver: &R) -> Result<Option<R::Model>, CartError> {
        match self.associated_model() {
            None => Ok(None),
            Some(reference) => resolver.instantiate(reference).map(Some),
        }
    }

    /// Line price: `price * quantity`, unformatted.
    pub fn price_total(&self) -> f64 {
        self.price() * self.quantity() as f64
    }

    /// Line price passed through the value formatter with this item's
    /// config.
    pub fn price_total_formatted(&self) -> Amount {
        format::format_value(self.price_total(), true, &self.config)
    }

    /// Convert to a plain JSON structure.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Convert to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
