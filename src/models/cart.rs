use serde::Serialize;

use crate::error::AppError;

pub const DEMO_ITEM_CODE: &str = "ITEM001";
pub const DEMO_ITEM_NAME: &str = "Açaí 500ml";
pub const DEMO_ITEM_PRICE: f64 = 22.99;

/// A cart line. `subtotal` is always `unit_price * quantity`; fields are
/// private so it can only change through `set_quantity`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CartItem {
    product_code: String,
    product_name: String,
    quantity: u32,
    unit_price: f64,
    subtotal: f64,
}

impl CartItem {
    pub fn new(
        product_code: impl Into<String>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: f64,
    ) -> Result<Self, AppError> {
        if quantity == 0 {
            return Err(AppError::InvalidInput(
                "quantity must be positive".to_string(),
            ));
        }
        Ok(Self {
            product_code: product_code.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
            subtotal: unit_price * f64::from(quantity),
        })
    }

    pub fn demo() -> Self {
        Self {
            product_code: DEMO_ITEM_CODE.to_string(),
            product_name: DEMO_ITEM_NAME.to_string(),
            quantity: 1,
            unit_price: DEMO_ITEM_PRICE,
            subtotal: DEMO_ITEM_PRICE,
        }
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.subtotal = self.unit_price * f64::from(quantity);
    }
}

/// In-memory cart for one table session. Never persisted.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: CartItem) {
        self.items.push(item);
    }

    pub fn add_demo_item(&mut self) {
        self.push(CartItem::demo());
    }

    pub fn remove(&mut self, index: usize) -> Result<CartItem, AppError> {
        if index >= self.items.len() {
            return Err(out_of_range(index));
        }
        Ok(self.items.remove(index))
    }

    /// Sets the quantity of a line; zero or negative removes the line.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> Result<(), AppError> {
        if quantity <= 0 {
            return self.remove(index).map(|_| ());
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| AppError::InvalidInput(format!("quantity {} too large", quantity)))?;
        let item = self.items.get_mut(index).ok_or_else(|| out_of_range(index))?;
        item.set_quantity(quantity);
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }
}

fn out_of_range(index: usize) -> AppError {
    AppError::NotFound(format!("cart line {}", index))
}
