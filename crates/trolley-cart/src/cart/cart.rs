//! The session-backed cart.

use crate::collection::{Key, KeyedCollection};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::format::{self, Amount};
use crate::value::FieldValue;
use tracing::debug;
use trolley_store::SessionStore;

use super::item::Item;

/// The collection of items in a cart, keyed by item id.
pub type CartCollection = KeyedCollection<Item>;

/// Input record for [`Cart::add`].
#[derive(Debug, Clone)]
pub struct ItemInput {
    /// Item id, unique within the cart.
    pub id: Key,
    /// Item name.
    pub name: String,
    /// Unit price; normalized on add, so strings with thousands
    /// separators are accepted.
    pub price: FieldValue,
    /// Quantity.
    pub quantity: i64,
    /// Optional associated-model reference descriptor.
    pub associated_model: Option<String>,
}

impl ItemInput {
    /// Create an input record.
    pub fn new(
        id: impl Into<Key>,
        name: impl Into<String>,
        price: impl Into<FieldValue>,
        quantity: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.into(),
            quantity,
            associated_model: None,
        }
    }

    /// Attach an associated-model reference descriptor.
    pub fn with_model(mut self, reference: impl Into<String>) -> Self {
        self.associated_model = Some(reference.into());
        self
    }
}

/// Shapes accepted by [`Cart::add`]: one record, a batch, or a batch of
/// batches (flattened one level).
#[derive(Debug, Clone)]
pub enum AddRequest {
    One(ItemInput),
    Many(Vec<ItemInput>),
    Nested(Vec<Vec<ItemInput>>),
}

impl From<ItemInput> for AddRequest {
    fn from(input: ItemInput) -> Self {
        AddRequest::One(input)
    }
}

impl From<Vec<ItemInput>> for AddRequest {
    fn from(inputs: Vec<ItemInput>) -> Self {
        AddRequest::Many(inputs)
    }
}

impl From<Vec<Vec<ItemInput>>> for AddRequest {
    fn from(batches: Vec<Vec<ItemInput>>) -> Self {
        AddRequest::Nested(batches)
    }
}

/// A shopping cart persisted through a session store.
///
/// Every operation is an atomic read-modify-write cycle: the item
/// collection is rehydrated from the backend before each mutation and
/// written back after, never cached in between.
#[derive(Debug)]
pub struct Cart<S> {
    session: S,
    instance_name: String,
    session_key: String,
    session_key_cart_items: String,
    current_item_id: Option<Key>,
    config: CartConfig,
}

impl<S: SessionStore> Cart<S> {
    /// Create a cart bound to a session store and storage key.
    pub fn new(
        session: S,
        instance_name: impl Into<String>,
        session_key: impl Into<String>,
        config: CartConfig,
    ) -> Self {
        let session_key = session_key.into();
        let session_key_cart_items = cart_items_key(&session_key);
        Self {
            session,
            instance_name: instance_name.into(),
            session_key,
            session_key_cart_items,
            current_item_id: None,
            config,
        }
    }

    /// Rebind the session key, returning self for chaining.
    ///
    /// Fails with [`CartError::Configuration`] when the key is empty.
    pub fn set_session_key(&mut self, session_key: impl Into<String>) -> Result<&mut Self, CartError> {
        let session_key = session_key.into();
        if session_key.is_empty() {
            return Err(CartError::Configuration(
                "session key is required".to_string(),
            ));
        }

        self.session_key_cart_items = cart_items_key(&session_key);
        self.session_key = session_key;

        Ok(self)
    }

    /// The logical cart name.
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// The storage namespace key.
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// The formatting configuration.
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// The id most recently processed by [`Cart::add`].
    pub fn current_item_id(&self) -> Option<&Key> {
        self.current_item_id.as_ref()
    }

    /// Get an item by id.
    pub fn get(&self, id: impl Into<Key>) -> Result<Option<Item>, CartError> {
        Ok(self.content()?.pull(&id.into()))
    }

    /// Check whether an item exists by id.
    pub fn has(&self, id: impl Into<Key>) -> Result<bool, CartError> {
        Ok(self.content()?.has(&id.into()))
    }

    /// Add one record, a batch, or a nested batch of records.
    ///
    /// Adding an id that already exists delegates to [`Cart::update`],
    /// so the incoming quantity is applied as a relative delta rather
    /// than duplicating the item. Batches add sequentially; a repeated
    /// id inside one batch collapses the same way.
    pub fn add(&mut self, request: impl Into<AddRequest>) -> Result<&mut Self, CartError> {
        match request.into() {
            AddRequest::One(input) => self.add_one(input)?,
            AddRequest::Many(inputs) => {
                for input in inputs {
                    self.add_one(input)?;
                }
            }
            AddRequest::Nested(batches) => {
                for batch in batches {
                    for input in batch {
                        self.add_one(input)?;
                    }
                }
            }
        }

        Ok(self)
    }

    /// Apply a partial update to an item.
    ///
    /// The `quantity` key goes through the relative-quantity rule; every
    /// other key overwrites the field verbatim. `price` is not
    /// re-normalized here, so callers must pre-normalize it. A missing
    /// id is a silent no-op that still reports `Ok(true)`.
    pub fn update<I, K, F>(&mut self, id: impl Into<Key>, fields: I) -> Result<bool, CartError>
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<Key>,
        F: Into<FieldValue>,
    {
        let id = id.into();
        let mut cart = self.content()?;

        let Some(mut item) = cart.pull(&id) else {
            debug!(id = %id, "update of missing cart item ignored");
            return Ok(true);
        };

        for (key, value) in fields {
            let key = key.into();
            let value = value.into();
            if matches!(&key, Key::Name(name) if name == "quantity") {
                let next = relative_quantity(item.quantity(), &value)?;
                item.set("quantity", FieldValue::Int(next));
            } else {
                item.set(key, value);
            }
        }

        cart.put(id, item);
        self.save(&cart)?;

        Ok(true)
    }

    /// Remove an item by id; reports `Ok(true)` even when absent.
    pub fn remove(&mut self, id: impl Into<Key>) -> Result<bool, CartError> {
        let id = id.into();
        let mut cart = self.content()?;

        if !cart.has(&id) {
            debug!(id = %id, "remove of missing cart item ignored");
        }
        cart.forget([id]);
        self.save(&cart)?;

        Ok(true)
    }

    /// Replace the stored collection with an empty one.
    pub fn clear(&mut self) -> Result<bool, CartError> {
        self.save(&CartCollection::new())?;
        Ok(true)
    }

    /// Total price across all items, passed once through the value
    /// formatter. Empty cart totals 0.
    pub fn total(&self) -> Result<Amount, CartError> {
        let cart = self.content()?;
        let sum: f64 = cart.values().map(Item::price_total).sum();

        Ok(format::format_value(
            sum,
            self.config.format_numbers,
            &self.config,
        ))
    }

    /// Total quantity across all items; 0 for an empty cart.
    pub fn total_quantity(&self) -> Result<i64, CartError> {
        Ok(self.content()?.values().map(Item::quantity).sum())
    }

    /// Whether the stored collection has zero items.
    pub fn is_empty(&self) -> Result<bool, CartError> {
        Ok(self.content()?.is_empty())
    }

    /// Rehydrate the full item collection from the session store.
    ///
    /// Always a fresh read; the formatting config is re-injected into
    /// every item.
    pub fn content(&self) -> Result<CartCollection, CartError> {
        let stored: Option<CartCollection> = self.session.get(&self.session_key_cart_items)?;

        Ok(match stored {
            Some(items) => items
                .into_iter()
                .map(|(id, item)| (id, item.with_config(self.config.clone())))
                .collect(),
            None => CartCollection::new(),
        })
    }

    fn add_one(&mut self, input: ItemInput) -> Result<(), CartError> {
        let id = input.id;
        let price = format::normalize_price(&input.price)?;

        let mut fields = KeyedCollection::new();
        fields.put(
            "id",
            match &id {
                Key::Index(index) => FieldValue::Int(*index),
                Key::Name(name) => FieldValue::Str(name.clone()),
            },
        );
        fields.put("name", FieldValue::Str(input.name));
        fields.put("price", FieldValue::Float(price));
        fields.put("quantity", FieldValue::Int(input.quantity));
        if let Some(reference) = input.associated_model.filter(|r| !r.is_empty()) {
            fields.put("associatedModel", FieldValue::Str(reference));
        }

        if self.content()?.has(&id) {
            self.update(id.clone(), fields)?;
        } else {
            self.add_row(id.clone(), fields)?;
        }

        self.current_item_id = Some(id);
        Ok(())
    }

    fn add_row(&mut self, id: Key, fields: KeyedCollection<FieldValue>) -> Result<(), CartError> {
        let mut cart = self.content()?;
        cart.put(id, Item::new(fields, self.config.clone()));
        self.save(&cart)
    }

    fn save(&self, cart: &CartCollection) -> Result<(), CartError> {
        self.session.put(&self.session_key_cart_items, cart)?;
        Ok(())
    }
}

fn cart_items_key(session_key: &str) -> String {
    format!("{session_key}_cart_items")
}

/// Apply a quantity value as a relative delta.
///
/// A textual `-` means decrease, but never to zero or below (the update
/// is dropped instead); `+` means increase; a bare number is additive,
/// never an absolute replacement.
fn relative_quantity(current: i64, value: &FieldValue) -> Result<i64, CartError> {
    let text = value.to_string();
    let delta = parse_magnitude(&text)?;

    if text.contains('-') {
        if current - delta > 0 {
            Ok(current - delta)
        } else {
            Ok(current)
        }
    } else {
        Ok(current + delta)
    }
}

/// Integer magnitude of a quantity delta, signs stripped. Fractional
/// values truncate.
fn parse_magnitude(text: &str) -> Result<i64, CartError> {
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, '-' | '+'))
        .collect::<String>()
        .trim()
        .to_string();

    if digits.is_empty() {
        return Err(CartError::Format(text.to_string()));
    }

    digits
        .parse::<i64>()
        .or_else(|_| digits.parse::<f64>().map(|f| f as i64))
        .map_err(|_| CartError::Format(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::item::{ModelResolver, NoModels};
    use trolley_store::MemoryStore;

    fn cart() -> Cart<MemoryStore> {
        Cart::new(
            MemoryStore::new(),
            "shopping",
            "SAMPLESESSIONKEY",
            CartConfig::default(),
        )
    }

    fn three_items() -> Vec<ItemInput> {
        vec![
            ItemInput::new(456, "Sample Item 1", 67.99, 4).with_model("product:shirt"),
            ItemInput::new(568, "Sample Item 2", 69.25, 4).with_model("product:mug"),
            ItemInput::new(856, "Sample Item 3", 50.25, 4).with_model("product:cap"),
        ]
    }

    struct Catalog;

    #[derive(Debug, PartialEq)]
    struct Product(String);

    impl ModelResolver for Catalog {
        type Model = Product;

        fn instantiate(&self, reference: &FieldValue) -> Result<Product, CartError> {
            match reference.as_str() {
                Some(name) if name.starts_with("product:") => Ok(Product(name.to_string())),
                _ => Err(CartError::Instantiation(reference.to_string())),
            }
        }
    }

    #[test]
    fn test_can_add_item() {
        let mut cart = cart();
        cart.add(ItemInput::new(455, "Sample Item", 100.99, 2))
            .unwrap();

        assert!(!cart.is_empty().unwrap());

        let content = cart.content().unwrap();
        assert_eq!(content.len(), 1);
        let first = content.first().unwrap();
        assert_eq!(first.id(), Some(&FieldValue::Int(455)));
        assert_eq!(first.price(), 100.99);
        assert_eq!(cart.current_item_id(), Some(&Key::Index(455)));
    }

    #[test]
    fn test_can_add_batch() {
        let mut cart = cart();
        cart.add(three_items()).unwrap();

        assert!(!cart.is_empty().unwrap());
        assert_eq!(cart.content().unwrap().len(), 3);
        assert_eq!(cart.total_quantity().unwrap(), 12);
    }

    #[test]
    fn test_can_add_nested_batches() {
        let mut cart = cart();
        cart.add(vec![
            vec![ItemInput::new(456, "Sample Item 1", 67.99, 4)],
            vec![
                ItemInput::new(568, "Sample Item 2", 69.25, 4),
                ItemInput::new(856, "Sample Item 3", 50.25, 4),
            ],
        ])
        .unwrap();

        assert_eq!(cart.content().unwrap().len(), 3);
    }

    #[test]
    fn test_add_existing_id_updates_instead_of_duplicating() {
        let mut cart = cart();
        cart.add(ItemInput::new(456, "Sample Item", 67.99, 3))
            .unwrap();
        cart.add(ItemInput::new(456, "Sample Item", 67.99, 2))
            .unwrap();

        let content = cart.content().unwrap();
        assert_eq!(content.len(), 1);
        // add on an existing id routes through update, so quantity adds
        assert_eq!(cart.total_quantity().unwrap(), 5);
    }

    #[test]
    fn test_duplicate_ids_in_one_batch_collapse() {
        let mut cart = cart();
        cart.add(vec![
            ItemInput::new(456, "Sample Item", 67.99, 1),
            ItemInput::new(456, "Sample Item", 67.99, 2),
        ])
        .unwrap();

        assert_eq!(cart.content().unwrap().len(), 1);
        assert_eq!(cart.total_quantity().unwrap(), 3);
    }

    #[test]
    fn test_get_and_has() {
        let mut cart = cart();
        cart.add(ItemInput::new(456, "Sample Item", 67.99, 4))
            .unwrap();

        assert!(cart.has(456).unwrap());
        assert!(!cart.has(999).unwrap());

        let item = cart.get(456).unwrap().unwrap();
        assert_eq!(item.name(), Some("Sample Item"));
        assert!(cart.get("456").unwrap().is_some());
        assert!(cart.get(999).unwrap().is_none());
    }

    #[test]
    fn test_update_existing_item() {
        let mut cart = cart();
        cart.add(vec![
            ItemInput::new(456, "Sample Item 1", 67.99, 3),
            ItemInput::new(568, "Sample Item 2", 69.25, 1),
        ])
        .unwrap();

        cart.update(
            456,
            [
                ("name", FieldValue::from("Renamed")),
                ("quantity", FieldValue::Int(2)),
                ("price", FieldValue::Int(105)),
            ],
        )
        .unwrap();

        let item = cart.get(456).unwrap().unwrap();
        assert_eq!(item.name(), Some("Renamed"));
        assert_eq!(item.price(), 105.0);
        // a bare number is additive: 3 + 2
        assert_eq!(item.quantity(), 5);
    }

    #[test]
    fn test_relative_quantity_rule() {
        let mut cart = cart();
        cart.add(ItemInput::new(456, "Sample Item", 67.99, 3))
            .unwrap();

        // a decrease below 1 is dropped
        cart.update(456, [("quantity", FieldValue::from("-5"))])
            .unwrap();
        assert_eq!(cart.get(456).unwrap().unwrap().quantity(), 3);

        cart.update(456, [("quantity", FieldValue::from("-2"))])
            .unwrap();
        assert_eq!(cart.get(456).unwrap().unwrap().quantity(), 1);

        cart.update(456, [("quantity", FieldValue::from("+2"))])
            .unwrap();
        assert_eq!(cart.get(456).unwrap().unwrap().quantity(), 3);

        cart.update(456, [("quantity", FieldValue::Int(2))]).unwrap();
        assert_eq!(cart.get(456).unwrap().unwrap().quantity(), 5);

        cart.update(456, [("quantity", FieldValue::Int(-4))]).unwrap();
        assert_eq!(cart.get(456).unwrap().unwrap().quantity(), 1);
    }

    #[test]
    fn test_update_missing_id_is_silent_noop() {
        let mut cart = cart();
        let updated = cart
            .update(999, [("name", FieldValue::from("Ghost"))])
            .unwrap();

        assert!(updated);
        assert!(cart.is_empty().unwrap());
    }

    #[test]
    fn test_update_rejects_unparsable_quantity() {
        let mut cart = cart();
        cart.add(ItemInput::new(456, "Sample Item", 67.99, 3))
            .unwrap();

        let err = cart
            .update(456, [("quantity", FieldValue::from("soon"))])
            .unwrap_err();
        assert!(matches!(err, CartError::Format(_)));
    }

    #[test]
    fn test_remove() {
        let mut cart = cart();
        cart.add(ItemInput::new(456, "Sample Item", 67.99, 4))
            .unwrap();

        assert!(cart.remove(456).unwrap());
        assert!(cart.is_empty().unwrap());

        // removing a missing id still reports true
        assert!(cart.remove(456).unwrap());
    }

    #[test]
    fn test_clear() {
        let mut cart = cart();
        cart.add(three_items()).unwrap();
        assert!(!cart.is_empty().unwrap());

        assert!(cart.clear().unwrap());
        assert!(cart.is_empty().unwrap());
        assert_eq!(cart.total_quantity().unwrap(), 0);
    }

    #[test]
    fn test_total() {
        let mut cart = cart();
        cart.add(vec![
            ItemInput::new(456, "Sample Item 1", 67.99, 3),
            ItemInput::new(568, "Sample Item 2", 69.25, 1),
        ])
        .unwrap();

        let total = cart.total().unwrap();
        assert!((total.as_f64().unwrap() - 273.22).abs() < 1e-9);
    }

    #[test]
    fn test_total_empty_cart_is_zero() {
        let cart = cart();
        assert_eq!(cart.total().unwrap().as_f64(), Some(0.0));
    }

    #[test]
    fn test_total_formatted() {
        let mut cart = Cart::new(
            MemoryStore::new(),
            "shopping",
            "SAMPLESESSIONKEY",
            CartConfig::new().with_format_numbers(true),
        );
        cart.add(ItemInput::new(456, "Sample Item", "1,000.50", 2))
            .unwrap();

        assert_eq!(cart.total().unwrap().as_display(), Some("2,001.00"));
    }

    #[test]
    fn test_total_quantity() {
        let mut cart = cart();
        cart.add(vec![
            ItemInput::new(456, "Sample Item 1", 67.99, 3),
            ItemInput::new(568, "Sample Item 2", 69.25, 1),
        ])
        .unwrap();

        assert_eq!(cart.total_quantity().unwrap(), 4);
    }

    #[test]
    fn test_instance_name() {
        assert_eq!(cart().instance_name(), "shopping");
    }

    #[test]
    fn test_set_session_key_rejects_empty() {
        let mut cart = cart();
        let err = cart.set_session_key("").unwrap_err();
        assert!(matches!(err, CartError::Configuration(_)));
    }

    #[test]
    fn test_distinct_session_keys_are_independent() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut wishlist = Cart::new(
            std::sync::Arc::clone(&store),
            "wishlist",
            "WISHLIST",
            CartConfig::default(),
        );
        let mut shopping = Cart::new(store, "shopping", "SHOPPING", CartConfig::default());

        wishlist
            .add(ItemInput::new(1, "Saved Item", 9.99, 1))
            .unwrap();
        shopping
            .add(ItemInput::new(2, "Bought Item", 5.00, 2))
            .unwrap();

        assert_eq!(wishlist.content().unwrap().len(), 1);
        assert_eq!(shopping.content().unwrap().len(), 1);
        assert!(wishlist.has(1).unwrap());
        assert!(!wishlist.has(2).unwrap());
    }

    #[test]
    fn test_rebinding_session_key_switches_storage() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut cart = Cart::new(
            std::sync::Arc::clone(&store),
            "shopping",
            "FIRST",
            CartConfig::default(),
        );

        cart.add(ItemInput::new(1, "First Item", 9.99, 1)).unwrap();
        cart.set_session_key("SECOND").unwrap();
        assert_eq!(cart.session_key(), "SECOND");
        assert!(cart.is_empty().unwrap());

        cart.set_session_key("FIRST").unwrap();
        assert!(cart.has(1).unwrap());
    }

    #[test]
    fn test_items_round_trip_through_store_with_models() {
        let mut cart = cart();
        cart.add(three_items()).unwrap();

        for item in cart.content().unwrap().values() {
            assert!(item.model(&Catalog).unwrap().is_some());
        }
    }

    #[test]
    fn test_add_without_model_resolves_to_none() {
        let mut cart = cart();
        cart.add(ItemInput::new(456, "Sample Item", 67.99, 4))
            .unwrap();

        let item = cart.get(456).unwrap().unwrap();
        assert_eq!(item.model(&NoModels).unwrap(), None);
    }

    #[test]
    fn test_empty_model_reference_is_not_stored() {
        let mut cart = cart();
        cart.add(ItemInput::new(456, "Sample Item", 67.99, 4).with_model(""))
            .unwrap();

        let item = cart.get(456).unwrap().unwrap();
        assert_eq!(item.associated_model(), None);
    }

    #[test]
    fn test_content_round_trip_reproduces_fields() {
        let mut cart = cart();
        cart.add(vec![
            ItemInput::new(456, "Sample Item 1", 67.99, 4),
            ItemInput::new("sku-9", "Sample Item 2", "1,355.00", 1),
        ])
        .unwrap();

        let value = cart.content().unwrap().to_value().unwrap();
        let rebuilt: CartCollection = serde_json::from_value(value).unwrap();

        assert_eq!(rebuilt.len(), 2);
        let first = rebuilt.get(&Key::from(456)).unwrap();
        assert_eq!(first.name(), Some("Sample Item 1"));
        assert_eq!(first.price(), 67.99);
        assert_eq!(first.quantity(), 4);
        let second = rebuilt.get(&Key::from("sku-9")).unwrap();
        assert_eq!(second.price(), 1355.0);
    }

    #[test]
    fn test_string_price_is_normalized_on_add() {
        let mut cart = cart();
        cart.add(ItemInput::new(456, "Sample Item", "1,355.00", 1))
            .unwrap();

        assert_eq!(cart.get(456).unwrap().unwrap().price(), 1355.0);
    }

    #[test]
    fn test_add_rejects_unparsable_price() {
        let mut cart = cart();
        let err = cart
            .add(ItemInput::new(456, "Sample Item", "free", 1))
            .unwrap_err();

        assert!(matches!(err, CartError::Format(_)));
        assert!(cart.is_empty().unwrap());
    }
}
