//! Shopping cart
//!
//! `CartStore` is created once at startup and handed to whatever needs the
//! cart. It follows the session: signing in loads that user's cart (or the
//! device's anonymous cart when the user has none), signing out empties it.
//! Every change is written to the anonymous slot and, while signed in, to
//! the user's slot.

mod storage;

pub use storage::{CartSlot, CartStorage, JsonFileCartStorage, MemoryCartStorage};

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::{CartItem, Product};

use crate::error::{ClientError, ClientResult};

/// Selected attribute value per attribute name
pub type Attributes = BTreeMap<String, String>;

pub struct CartStore<S> {
    storage: S,
    user: Option<String>,
    items: Vec<CartItem>,
}

impl<S: CartStorage> CartStore<S> {
    /// Start signed out with the anonymous cart
    pub fn new(storage: S) -> ClientResult<Self> {
        let items = storage.load(&CartSlot::Anonymous)?.unwrap_or_default();
        Ok(Self {
            storage,
            user: None,
            items,
        })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Purchasing requires a signed-in session
    pub fn can_buy(&self) -> bool {
        self.user.is_some()
    }

    /// Switch to `user_id`'s cart, or the anonymous cart if they have none
    pub fn sign_in(&mut self, user_id: impl Into<String>) -> ClientResult<()> {
        let user_id = user_id.into();
        let slot = CartSlot::User(user_id.clone());
        self.items = match self.storage.load(&slot)? {
            Some(items) => items,
            None => self
                .storage
                .load(&CartSlot::Anonymous)?
                .unwrap_or_default(),
        };
        tracing::debug!(user = %user_id, items = self.items.len(), "Cart loaded for user");
        self.user = Some(user_id);
        Ok(())
    }

    /// Drop the session and empty the visible cart
    ///
    /// The user's own slot is kept for their next sign-in.
    pub fn sign_out(&mut self) -> ClientResult<()> {
        self.user = None;
        self.items.clear();
        self.storage.save(&CartSlot::Anonymous, &self.items)
    }

    /// Add a product with its selected attributes
    ///
    /// A line with the same product and attributes grows by `quantity`;
    /// quantities below 1 count as 1.
    pub fn add(&mut self, product: &Product, attributes: Attributes, quantity: u32) -> ClientResult<()> {
        if !self.can_buy() {
            return Err(ClientError::Unauthorized);
        }
        let quantity = quantity.max(1);
        match self
            .items
            .iter()
            .position(|item| item.is_same_line(&product.id, &attributes))
        {
            Some(pos) => {
                let item = &mut self.items[pos];
                item.quantity = item.quantity.saturating_add(quantity);
            }
            None => self.items.push(CartItem {
                id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
                quantity,
                attributes,
            }),
        }
        self.persist()
    }

    /// Remove a line; unknown lines are ignored
    pub fn remove(&mut self, id: &str, attributes: &Attributes) -> ClientResult<()> {
        let before = self.items.len();
        self.items.retain(|item| !item.is_same_line(id, attributes));
        if self.items.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Set a line's quantity, never below 1
    pub fn set_quantity(&mut self, id: &str, attributes: &Attributes, quantity: u32) -> ClientResult<()> {
        let Some(item) = self.line_mut(id, attributes) else {
            return Ok(());
        };
        item.quantity = quantity.max(1);
        self.persist()
    }

    pub fn increase(&mut self, id: &str, attributes: &Attributes) -> ClientResult<()> {
        let Some(quantity) = self.line_mut(id, attributes).map(|i| i.quantity) else {
            return Ok(());
        };
        self.set_quantity(id, attributes, quantity.saturating_add(1))
    }

    pub fn decrease(&mut self, id: &str, attributes: &Attributes) -> ClientResult<()> {
        let Some(quantity) = self.line_mut(id, attributes).map(|i| i.quantity) else {
            return Ok(());
        };
        self.set_quantity(id, attributes, quantity.saturating_sub(1))
    }

    pub fn clear(&mut self) -> ClientResult<()> {
        self.items.clear();
        self.persist()
    }

    /// Units across all lines
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    fn line_mut(&mut self, id: &str, attributes: &Attributes) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.is_same_line(id, attributes))
    }

    fn persist(&self) -> ClientResult<()> {
        self.storage.save(&CartSlot::Anonymous, &self.items)?;
        if let Some(user) = &self.user {
            self.storage.save(&CartSlot::User(user.clone()), &self.items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: id.into(),
            name: format!("Producto {id}"),
            price: Decimal::from(price),
            original_price: Decimal::from(price),
            discount: None,
            image_url: String::new(),
            category_id: None,
            category_path: Vec::new(),
            attributes: BTreeMap::new(),
            attribute_stock: BTreeMap::new(),
            stock: 10,
            active: true,
        }
    }

    fn color(value: &str) -> Attributes {
        Attributes::from([("Color".to_string(), value.to_string())])
    }

    fn signed_in() -> CartStore<MemoryCartStorage> {
        let mut cart = CartStore::new(MemoryCartStorage::new()).unwrap();
        cart.sign_in("u1").unwrap();
        cart
    }

    #[test]
    fn test_add_requires_session() {
        let mut cart = CartStore::new(MemoryCartStorage::new()).unwrap();
        let err = cart.add(&product("a", 10), Attributes::new(), 1).unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_merges_same_line() {
        let mut cart = signed_in();
        cart.add(&product("a", 10), color("Rojo"), 2).unwrap();
        cart.add(&product("a", 10), color("Rojo"), 0).unwrap();
        cart.add(&product("a", 10), color("Azul"), 1).unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.total_price(), Decimal::from(40));
    }

    #[test]
    fn test_quantity_never_below_one() {
        let mut cart = signed_in();
        let attrs = Attributes::new();
        cart.add(&product("a", 5), attrs.clone(), 1).unwrap();

        cart.decrease("a", &attrs).unwrap();
        assert_eq!(cart.items()[0].quantity, 1);
        cart.set_quantity("a", &attrs, 0).unwrap();
        assert_eq!(cart.items()[0].quantity, 1);
        cart.increase("a", &attrs).unwrap();
        cart.increase("a", &attrs).unwrap();
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = signed_in();
        cart.add(&product("a", 5), Attributes::new(), 1).unwrap();
        cart.add(&product("b", 7), Attributes::new(), 1).unwrap();

        cart.remove("a", &Attributes::new()).unwrap();
        cart.remove("missing", &Attributes::new()).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].id, "b");

        cart.clear().unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }
}
