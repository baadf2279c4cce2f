//! Totals computation for carts and order drafts.
//!
//! Everything here is pure: same line items and delivery state in, same
//! totals out, no side effects. Services that need a subtotal only (the
//! cart badge, the hamper preview) call [`PricingEngine::subtotal`]
//! directly; checkout uses [`PricingEngine::compute_totals`].

use rust_decimal::Decimal;

use crate::config::StorefrontConfig;
use crate::models::{CartLineItem, OrderTotals};

/// Rate table driving delivery and tax computation.
#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfig {
    /// Delivery state matched case-insensitively for the local rate.
    pub local_state: String,
    pub local_charge: Decimal,
    pub standard_charge: Decimal,
    /// Fraction of the subtotal charged as tax. Zero under current rules.
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            local_state: "gujarat".to_string(),
            local_charge: Decimal::from(60),
            standard_charge: Decimal::from(100),
            tax_rate: Decimal::ZERO,
        }
    }
}

/// Stateless pricing engine.
#[derive(Clone, Debug, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(PricingConfig {
            local_state: config.delivery.local_state.clone(),
            local_charge: Decimal::from(config.delivery.local_charge),
            standard_charge: Decimal::from(config.delivery.standard_charge),
            tax_rate: Decimal::from_f64_retain(config.tax_rate).unwrap_or(Decimal::ZERO),
        })
    }

    /// Sum of `unit_price * quantity` over the given lines.
    pub fn subtotal(items: &[CartLineItem]) -> Decimal {
        items.iter().map(CartLineItem::line_total).sum()
    }

    /// Delivery charge for a destination state.
    ///
    /// Unset or blank state means the charge cannot be quoted yet and is
    /// reported as zero; the local state gets the local rate, everywhere
    /// else the standard rate.
    pub fn delivery_charge(&self, delivery_state: Option<&str>) -> Decimal {
        let state = delivery_state.map(str::trim).unwrap_or("");
        if state.is_empty() {
            Decimal::ZERO
        } else if state.eq_ignore_ascii_case(&self.config.local_state) {
            self.config.local_charge
        } else {
            self.config.standard_charge
        }
    }

    /// Full totals breakdown for an order snapshot.
    pub fn compute_totals(
        &self,
        items: &[CartLineItem],
        delivery_state: Option<&str>,
    ) -> OrderTotals {
        let subtotal = Self::subtotal(items);
        let delivery_charge = self.delivery_charge(delivery_state);
        let tax = subtotal * self.config.tax_rate;

        OrderTotals {
            subtotal,
            delivery_charge,
            tax,
            total: subtotal + delivery_charge + tax,
        }
    }
}
