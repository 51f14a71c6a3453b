//! # Cart
//!
//! The in-memory cart shared by the counter (retailer billing) and the
//! marketplace (customer ordering).
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action            Cart Method             State Change         │
//! │  ──────────────            ───────────             ────────────         │
//! │                                                                         │
//! │  Scan / pick product ────► add_product() ────────► push or qty += 1    │
//! │                                                                         │
//! │  "−" button ─────────────► decrement() ──────────► qty -= 1, drop at 0 │
//! │                                                                         │
//! │  Type a quantity ────────► set_quantity() ───────► qty = n, drop at 0  │
//! │                                                                         │
//! │  Remove ─────────────────► remove() ─────────────► line dropped        │
//! │                                                                         │
//! │  Bill saved ─────────────► clear() ──────────────► lines.clear()       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id` (adding again bumps the quantity)
//! - Every line has `quantity > 0`; reaching 0 removes the line
//! - Line order is insertion order (receipts and order splits rely on it)

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// Name, barcode and price are frozen when the product is added, so a
/// catalogue reload mid-sale does not change what the customer is charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub barcode: String,
    pub unit_price: Money,
    pub quantity: u32,
    /// "pcs", "kg" or "L".
    pub unit: String,
    /// Owning retailer; set on marketplace carts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retailer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartLine {
    /// Creates a line with quantity 1 from a catalogue product.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            unit_price: product.price,
            quantity: 1,
            unit: product.product_type.unit_label().to_string(),
            retailer_id: product.retailer_id,
            image_url: product.image_url.clone(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Rebuilds a cart from stored lines, dropping zero-quantity leftovers.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Cart {
            lines: lines.into_iter().filter(|l| l.quantity > 0).collect(),
        }
    }

    /// Adds one unit of `product`, or bumps the quantity if already present.
    ///
    /// Products with no stock are refused. Stock beyond zero is not checked
    /// here; the backend rejects the bill if it cannot be fulfilled.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if product.is_out_of_stock() {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let new_qty = line.quantity + 1;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Removes one unit; the line disappears when it reaches zero.
    pub fn decrement(&mut self, product_id: i64) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CoreError::ProductNotInCart(product_id))?;

        line.quantity = line.quantity.saturating_sub(1);
        self.lines.retain(|l| l.quantity > 0);
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: i64, quantity: u32) -> CoreResult<()> {
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if quantity == 0 {
            return self.remove(product_id);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CoreError::ProductNotInCart(product_id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line regardless of quantity.
    pub fn remove(&mut self, product_id: i64) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CoreError::ProductNotInCart(product_id));
        }
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of `product_id` currently in the cart (0 when absent).
    pub fn quantity_of(&self, product_id: i64) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities over all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ unit price × quantity, before GST.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductType;

    fn product(id: i64, paise: i64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            barcode: format!("BC{}", id),
            price: Money::from_paise(paise),
            quantity: stock,
            product_type: ProductType::Unit,
            category: None,
            image_url: None,
            retailer_id: None,
        }
    }

    #[test]
    fn test_add_product_creates_line_then_increments() {
        let mut cart = Cart::new();
        let p = product(1, 999, 10);

        cart.add_product(&p).unwrap();
        cart.add_product(&p).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of(1), 2);
        assert_eq!(cart.subtotal(), Money::from_paise(1998));
        assert_eq!(cart.lines()[0].unit, "pcs");
    }

    #[test]
    fn test_out_of_stock_is_refused() {
        let mut cart = Cart::new();
        let err = cart.add_product(&product(1, 100, 0)).unwrap_err();
        assert_eq!(
            err,
            CoreError::OutOfStock {
                name: "Product 1".to_string()
            }
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_removes_at_zero() {
        let mut cart = Cart::new();
        let p = product(1, 100, 5);
        cart.add_product(&p).unwrap();
        cart.add_product(&p).unwrap();

        cart.decrement(1).unwrap();
        assert_eq!(cart.quantity_of(1), 1);

        cart.decrement(1).unwrap();
        assert!(cart.is_empty());
        assert!(cart.decrement(1).is_err());
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 100, 5)).unwrap();

        cart.set_quantity(1, 7).unwrap();
        assert_eq!(cart.total_quantity(), 7);

        assert!(cart.set_quantity(1, MAX_ITEM_QUANTITY + 1).is_err());
        assert_eq!(cart.total_quantity(), 7);

        cart.set_quantity(1, 0).unwrap();
        assert!(cart.is_empty());

        assert_eq!(cart.set_quantity(9, 2), Err(CoreError::ProductNotInCart(9)));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add_product(&product(3, 100, 5)).unwrap();
        cart.add_product(&product(1, 100, 5)).unwrap();
        cart.add_product(&product(3, 100, 5)).unwrap();

        let ids: Vec<i64> = cart.lines().iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_from_lines_drops_empty() {
        let mut line = CartLine::from_product(&product(1, 100, 5));
        line.quantity = 0;
        let cart = Cart::from_lines(vec![line]);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 100, 5)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
    }
}
