use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::auth::{SessionId, SessionRegistry};
use crate::errors::StorefrontError;
use crate::events::{Event, EventSender};
use crate::models::{CartLineItem, Product};
use crate::services::pricing::PricingEngine;

/// Session-scoped shopping cart store.
///
/// Line items are keyed by product identity within each session's cart.
/// Every mutation resolves the session through the [`SessionRegistry`]
/// first: anonymous sessions are answered with the sign-in redirect error
/// and the store is never touched on their behalf.
///
/// Quantities are clamped against the stock snapshot carried on each line;
/// the backend stays authoritative and re-checks at order time.
#[derive(Clone)]
pub struct CartStore {
    sessions: Arc<SessionRegistry>,
    carts: Arc<DashMap<SessionId, Vec<CartLineItem>>>,
    event_sender: EventSender,
}

impl CartStore {
    pub fn new(sessions: Arc<SessionRegistry>, event_sender: EventSender) -> Self {
        Self {
            sessions,
            carts: Arc::new(DashMap::new()),
            event_sender,
        }
    }

    /// Adds a product to the session's cart.
    ///
    /// A product with no stock is refused with `OutOfStock`. An existing
    /// line has its quantity incremented, clamped to the stock snapshot;
    /// otherwise a new quantity-1 line is inserted.
    ///
    /// Returns the resulting line so the caller can surface the effective
    /// quantity (which may be unchanged when the line was already at stock).
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(
        &self,
        session_id: SessionId,
        product: &Product,
    ) -> Result<CartLineItem, StorefrontError> {
        self.sessions.require_authenticated(session_id)?;

        if product.stock == 0 {
            return Err(StorefrontError::OutOfStock(product.name.clone()));
        }

        let line = {
            let mut cart = self.carts.entry(session_id).or_default();
            match cart.iter_mut().find(|l| l.product_id == product.id) {
                Some(existing) => {
                    let next = existing.quantity.saturating_add(1).min(existing.stock);
                    if next == existing.quantity {
                        debug!(
                            quantity = existing.quantity,
                            "quantity already at stock, clamped"
                        );
                    }
                    existing.quantity = next;
                    existing.clone()
                }
                None => {
                    let line = CartLineItem::from_product(product);
                    cart.push(line.clone());
                    line
                }
            }
        };

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                session_id,
                product_id: product.id,
                quantity: line.quantity,
            })
            .await;

        info!("Added {} x{} to cart", line.name, line.quantity);
        Ok(line)
    }

    /// Sets a line's quantity, clamped to `[0, stock]`. Zero removes the
    /// line. Returns the updated line, or `None` when it was removed.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        session_id: SessionId,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<Option<CartLineItem>, StorefrontError> {
        self.sessions.require_authenticated(session_id)?;

        let updated = {
            let mut cart = self
                .carts
                .get_mut(&session_id)
                .ok_or_else(|| StorefrontError::NotFound("cart is empty".to_string()))?;

            let index = cart
                .iter()
                .position(|l| l.product_id == product_id)
                .ok_or_else(|| {
                    StorefrontError::NotFound(format!("product {} not in cart", product_id))
                })?;

            if quantity == 0 {
                cart.remove(index);
                None
            } else {
                let line = &mut cart[index];
                let clamped = quantity.min(line.stock);
                if clamped < quantity {
                    debug!(requested = quantity, clamped, "quantity clamped to stock");
                }
                line.quantity = clamped;
                Some(line.clone())
            }
        };

        match &updated {
            Some(line) => {
                self.event_sender
                    .send_or_log(Event::CartItemUpdated {
                        session_id,
                        product_id,
                        quantity: line.quantity,
                    })
                    .await;
            }
            None => {
                self.event_sender
                    .send_or_log(Event::CartItemRemoved {
                        session_id,
                        product_id,
                    })
                    .await;
            }
        }

        Ok(updated)
    }

    /// Removes a line outright.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        session_id: SessionId,
        product_id: Uuid,
    ) -> Result<(), StorefrontError> {
        self.sessions.require_authenticated(session_id)?;

        let removed = self
            .carts
            .get_mut(&session_id)
            .map(|mut cart| {
                let before = cart.len();
                cart.retain(|l| l.product_id != product_id);
                cart.len() < before
            })
            .unwrap_or(false);

        if !removed {
            return Err(StorefrontError::NotFound(format!(
                "product {} not in cart",
                product_id
            )));
        }

        self.event_sender
            .send_or_log(Event::CartItemRemoved {
                session_id,
                product_id,
            })
            .await;

        Ok(())
    }

    /// Empties the session's cart. Called after a confirmed cart-sourced
    /// checkout; buy-now checkouts never reach this.
    #[instrument(skip(self))]
    pub async fn clear(&self, session_id: SessionId) -> Result<(), StorefrontError> {
        self.sessions.require_authenticated(session_id)?;

        self.carts.remove(&session_id);
        self.event_sender
            .send_or_log(Event::CartCleared { session_id })
            .await;

        info!("Cleared cart for session {}", session_id);
        Ok(())
    }

    /// Snapshot of the session's line items.
    pub fn items(&self, session_id: SessionId) -> Result<Vec<CartLineItem>, StorefrontError> {
        self.sessions.require_authenticated(session_id)?;
        Ok(self
            .carts
            .get(&session_id)
            .map(|c| c.value().clone())
            .unwrap_or_default())
    }

    /// Cart subtotal; delivery and tax are checkout concerns.
    pub fn total_price(&self, session_id: SessionId) -> Result<Decimal, StorefrontError> {
        let items = self.items(session_id)?;
        Ok(PricingEngine::subtotal(&items))
    }
}
