use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hamper configuration for assortment products.
///
/// A hamper is sold as a configurable set of packets spread across a fixed
/// list of flavors. `flavors` is ordered: the display order doubles as the
/// deterministic tie-break when the customizer tops a selection up to the
/// minimum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HamperConfig {
    /// Available flavors, in display order.
    pub flavors: Vec<String>,
    /// Price of a single packet.
    pub packet_price: Decimal,
    /// Weight of a single packet in grams.
    pub packet_weight_grams: u32,
    /// Minimum total packet count across all flavors.
    pub minimum_packets: u32,
}

/// A product as served by the catalog endpoints.
///
/// Immutable from the cart's perspective; `stock` is a snapshot and the
/// backend stays authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    /// Pre-discount price, when the product is on offer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub stock: u32,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Present only for hamper products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hamper: Option<HamperConfig>,
}

impl Product {
    pub fn is_hamper(&self) -> bool {
        self.hamper.is_some()
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
