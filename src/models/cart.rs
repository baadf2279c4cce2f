use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::Product;

/// One flavor's share of a hamper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketSelection {
    pub flavor: String,
    pub count: u32,
}

/// A line in a cart or order.
///
/// `stock` is the availability snapshot taken when the line was created and
/// bounds every later quantity update. `contents` is present only on
/// synthetic hamper lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<PacketSelection>>,
}

impl CartLineItem {
    /// Creates a quantity-1 line from a catalog product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity: 1,
            stock: product.stock,
            image_url: product.image_url.clone(),
            contents: None,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_product_starts_at_quantity_one() {
        let product = Product {
            id: Uuid::new_v4(),
            name: "Roasted Cashews".to_string(),
            unit_price: dec!(450.00),
            original_price: None,
            stock: 8,
            category: "dryfruits".to_string(),
            image_url: None,
            hamper: None,
        };

        let line = CartLineItem::from_product(&product);
        assert_eq!(line.quantity, 1);
        assert_eq!(line.stock, 8);
        assert_eq!(line.unit_price, dec!(450.00));
        assert!(line.contents.is_none());
    }

    #[test]
    fn test_line_total() {
        let line = CartLineItem {
            product_id: Uuid::new_v4(),
            name: "Banana Chips".to_string(),
            unit_price: dec!(60.00),
            quantity: 3,
            stock: 10,
            image_url: None,
            contents: None,
        };

        assert_eq!(line.line_total(), dec!(180.00));
    }
}
