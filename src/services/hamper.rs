use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::StorefrontError;
use crate::events::{Event, EventSender};
use crate::models::{CartLineItem, HamperConfig, PacketSelection, Product};

/// Packet allocator for hamper products.
///
/// Tracks one packet count per flavor, in the configured flavor order, and
/// enforces the minimum-total-packets constraint: decrements that would
/// drop the running total below the minimum are refused outright, never
/// clamped. A committed selection becomes a synthetic line item headed for
/// buy-now checkout; dropping the customizer without committing discards
/// the selection.
#[derive(Debug)]
pub struct HamperCustomizer {
    product_id: Uuid,
    product_name: String,
    image_url: Option<String>,
    config: HamperConfig,
    /// Parallel to `config.flavors`.
    counts: Vec<u32>,
    event_sender: EventSender,
}

impl HamperCustomizer {
    /// Builds a customizer for a hamper product, all counts at zero.
    pub fn for_product(
        product: &Product,
        event_sender: EventSender,
    ) -> Result<Self, StorefrontError> {
        let config = product.hamper.clone().ok_or_else(|| {
            StorefrontError::InvalidOperation(format!("{} is not a hamper", product.name))
        })?;

        Ok(Self {
            product_id: product.id,
            product_name: product.name.clone(),
            image_url: product.image_url.clone(),
            counts: vec![0; config.flavors.len()],
            config,
            event_sender,
        })
    }

    /// Opens the customizer for editing.
    ///
    /// When the selection is below the minimum the whole deficit goes to
    /// the first flavor in config order, so an opened customizer always
    /// starts valid. Returns the number of packets topped up.
    #[instrument(skip(self), fields(product_id = %self.product_id))]
    pub async fn open(&mut self) -> u32 {
        let deficit = self
            .config
            .minimum_packets
            .saturating_sub(self.total_packets());

        if deficit > 0 {
            if let Some(first) = self.counts.first_mut() {
                *first += deficit;
            }
            info!(deficit, "topped selection up to minimum");
        }

        self.event_sender
            .send_or_log(Event::HamperOpened {
                product_id: self.product_id,
                topped_up: deficit,
            })
            .await;

        deficit
    }

    /// Current count for a flavor.
    pub fn count(&self, flavor: &str) -> Option<u32> {
        self.flavor_index(flavor).map(|i| self.counts[i])
    }

    pub fn total_packets(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Applies a delta to one flavor's count and returns the new count.
    ///
    /// The candidate count floors at zero. A decrement that would take the
    /// total below the minimum is refused and leaves the selection
    /// unchanged.
    pub fn update_count(&mut self, flavor: &str, delta: i32) -> Result<u32, StorefrontError> {
        let index = self.flavor_index(flavor).ok_or_else(|| {
            StorefrontError::NotFound(format!("no {} flavor in this hamper", flavor))
        })?;

        let old = self.counts[index];
        let candidate = old.saturating_add_signed(delta);

        if delta < 0 {
            let new_total = self.total_packets() - old + candidate;
            if new_total < self.config.minimum_packets {
                warn!(
                    flavor,
                    minimum = self.config.minimum_packets,
                    "decrement refused, would drop below minimum"
                );
                return Err(StorefrontError::InvalidOperation(format!(
                    "a hamper needs at least {} packets",
                    self.config.minimum_packets
                )));
            }
        }

        self.counts[index] = candidate;
        Ok(candidate)
    }

    /// Price of the current selection.
    pub fn compute_price(&self) -> Decimal {
        self.config.packet_price * Decimal::from(self.total_packets())
    }

    /// Flavors with a non-zero count, in config order.
    pub fn selection(&self) -> Vec<PacketSelection> {
        self.config
            .flavors
            .iter()
            .zip(&self.counts)
            .filter(|(_, &count)| count > 0)
            .map(|(flavor, &count)| PacketSelection {
                flavor: flavor.clone(),
                count,
            })
            .collect()
    }

    /// Finalizes the selection into a synthetic line item for buy-now
    /// checkout. The general cart is bypassed entirely.
    #[instrument(skip(self), fields(product_id = %self.product_id))]
    pub async fn commit(&self) -> Result<CartLineItem, StorefrontError> {
        let total = self.total_packets();
        if total < self.config.minimum_packets {
            return Err(StorefrontError::InvalidOperation(format!(
                "a hamper needs at least {} packets",
                self.config.minimum_packets
            )));
        }

        self.event_sender
            .send_or_log(Event::HamperCommitted {
                product_id: self.product_id,
                total_packets: total,
            })
            .await;

        info!(total, "hamper committed");
        Ok(CartLineItem {
            product_id: self.product_id,
            name: self.product_name.clone(),
            unit_price: self.compute_price(),
            quantity: 1,
            stock: 1,
            image_url: self.image_url.clone(),
            contents: Some(self.selection()),
        })
    }

    fn flavor_index(&self, flavor: &str) -> Option<usize> {
        self.config.flavors.iter().position(|f| f == flavor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn hamper_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Festive Hamper".to_string(),
            unit_price: dec!(0),
            original_price: None,
            stock: 50,
            category: "hampers".to_string(),
            image_url: Some("https://cdn.example.com/hamper.jpg".to_string()),
            hamper: Some(HamperConfig {
                flavors: vec![
                    "Masala".to_string(),
                    "Classic".to_string(),
                    "Tangy".to_string(),
                ],
                packet_price: dec!(50.00),
                packet_weight_grams: 100,
                minimum_packets: 10,
            }),
        }
    }

    async fn open_customizer() -> HamperCustomizer {
        let (event_sender, _rx) = EventSender::channel(64);
        let mut customizer =
            HamperCustomizer::for_product(&hamper_product(), event_sender).expect("hamper");
        customizer.open().await;
        customizer
    }

    // ==================== Construction Tests ====================

    #[tokio::test]
    async fn test_non_hamper_product_refused() {
        let (event_sender, _rx) = EventSender::channel(8);
        let mut plain = hamper_product();
        plain.hamper = None;

        let err = HamperCustomizer::for_product(&plain, event_sender).unwrap_err();
        assert_matches!(err, StorefrontError::InvalidOperation(_));
    }

    // ==================== Open / Top-Up Tests ====================

    #[tokio::test]
    async fn test_open_assigns_deficit_to_first_flavor() {
        let customizer = open_customizer().await;

        assert_eq!(customizer.count("Masala"), Some(10));
        assert_eq!(customizer.count("Classic"), Some(0));
        assert_eq!(customizer.count("Tangy"), Some(0));
        assert_eq!(customizer.total_packets(), 10);
    }

    #[tokio::test]
    async fn test_open_reports_top_up_size() {
        let (event_sender, _rx) = EventSender::channel(8);
        let mut customizer =
            HamperCustomizer::for_product(&hamper_product(), event_sender).expect("hamper");

        assert_eq!(customizer.open().await, 10);
        // Already at the minimum, nothing more to add.
        assert_eq!(customizer.open().await, 0);
    }

    #[tokio::test]
    async fn test_open_with_partial_selection_tops_up_remainder() {
        let (event_sender, _rx) = EventSender::channel(8);
        let mut customizer =
            HamperCustomizer::for_product(&hamper_product(), event_sender).expect("hamper");
        customizer.update_count("Classic", 4).expect("increment");

        assert_eq!(customizer.open().await, 6);
        assert_eq!(customizer.count("Masala"), Some(6));
        assert_eq!(customizer.count("Classic"), Some(4));
    }

    // ==================== Update Count Tests ====================

    #[tokio::test]
    async fn test_increment_always_allowed() {
        let mut customizer = open_customizer().await;

        assert_eq!(customizer.update_count("Tangy", 3).expect("inc"), 3);
        assert_eq!(customizer.total_packets(), 13);
    }

    #[tokio::test]
    async fn test_decrement_at_minimum_refused() {
        let mut customizer = open_customizer().await;

        let err = customizer.update_count("Masala", -1).unwrap_err();
        assert_matches!(err, StorefrontError::InvalidOperation(_));
        // State unchanged, not clamped.
        assert_eq!(customizer.count("Masala"), Some(10));
        assert_eq!(customizer.total_packets(), 10);
    }

    #[tokio::test]
    async fn test_decrement_above_minimum_allowed() {
        let mut customizer = open_customizer().await;
        customizer.update_count("Classic", 5).expect("inc");

        assert_eq!(customizer.update_count("Masala", -3).expect("dec"), 7);
        assert_eq!(customizer.total_packets(), 12);
    }

    #[tokio::test]
    async fn test_count_never_goes_negative() {
        let mut customizer = open_customizer().await;
        customizer.update_count("Classic", 8).expect("inc");

        // Masala has 10; a -15 delta floors at zero, total stays 8 + 0 < 10
        // only if the floor dropped below minimum, which it would, so it is
        // refused.
        let err = customizer.update_count("Masala", -15).unwrap_err();
        assert_matches!(err, StorefrontError::InvalidOperation(_));

        // With enough elsewhere, the same delta floors cleanly at zero.
        customizer.update_count("Tangy", 12).expect("inc");
        assert_eq!(customizer.update_count("Masala", -15).expect("dec"), 0);
        assert_eq!(customizer.count("Masala"), Some(0));
    }

    #[tokio::test]
    async fn test_unknown_flavor_not_found() {
        let mut customizer = open_customizer().await;
        let err = customizer.update_count("Chocolate", 1).unwrap_err();
        assert_matches!(err, StorefrontError::NotFound(_));
    }

    // ==================== Price Tests ====================

    #[rstest]
    #[case(0, dec!(500.00))]
    #[case(2, dec!(600.00))]
    #[case(10, dec!(1000.00))]
    #[tokio::test]
    async fn test_price_scales_with_packets(#[case] extra: i32, #[case] expected: Decimal) {
        let mut customizer = open_customizer().await;
        if extra > 0 {
            customizer.update_count("Classic", extra).expect("inc");
        }
        assert_eq!(customizer.compute_price(), expected);
    }

    // ==================== Commit Tests ====================

    #[tokio::test]
    async fn test_commit_below_minimum_refused() {
        let (event_sender, _rx) = EventSender::channel(8);
        let customizer =
            HamperCustomizer::for_product(&hamper_product(), event_sender).expect("hamper");

        // Never opened, still all zero.
        let err = customizer.commit().await.unwrap_err();
        assert_matches!(err, StorefrontError::InvalidOperation(_));
    }

    #[tokio::test]
    async fn test_commit_builds_synthetic_line() {
        let mut customizer = open_customizer().await;
        customizer.update_count("Tangy", 2).expect("inc");

        let line = customizer.commit().await.expect("commit");
        assert_eq!(line.quantity, 1);
        assert_eq!(line.unit_price, dec!(600.00));

        let contents = line.contents.expect("contents present");
        assert_eq!(
            contents,
            vec![
                PacketSelection {
                    flavor: "Masala".to_string(),
                    count: 10
                },
                PacketSelection {
                    flavor: "Tangy".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_commit_skips_zero_count_flavors() {
        let customizer = open_customizer().await;
        let line = customizer.commit().await.expect("commit");

        let contents = line.contents.expect("contents present");
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].flavor, "Masala");
    }
}
