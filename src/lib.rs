//! Storefront Core Library
//!
//! Client-side storefront logic over a REST backend: session-scoped carts,
//! hamper customization, pricing, and checkout orchestration. Rendering,
//! routing and token storage belong to the UI shell; the backend owns
//! persistence and is reached only through [`client::StorefrontBackend`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::auth::{SessionId, SessionRegistry};
use crate::client::StorefrontBackend;
use crate::errors::StorefrontError;
use crate::events::EventSender;
use crate::models::{CartLineItem, CheckoutSource, Product};
use crate::services::{CartStore, CheckoutOrchestrator, HamperCustomizer, PricingEngine};

/// The wired-up storefront: one value owning the session registry, cart
/// store, pricing engine and backend handle.
///
/// This is the injection point the UI shell holds on to; state is passed
/// explicitly from here rather than living in ambient context.
#[derive(Clone)]
pub struct Storefront {
    pub config: config::StorefrontConfig,
    pub sessions: Arc<SessionRegistry>,
    pub cart: Arc<CartStore>,
    pub pricing: PricingEngine,
    pub backend: Arc<dyn StorefrontBackend>,
    pub event_sender: EventSender,
}

impl Storefront {
    pub fn new(
        config: config::StorefrontConfig,
        backend: Arc<dyn StorefrontBackend>,
        event_sender: EventSender,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new());
        let pricing = PricingEngine::from_config(&config);
        let cart = Arc::new(CartStore::new(sessions.clone(), event_sender.clone()));

        Self {
            config,
            sessions,
            cart,
            pricing,
            backend,
            event_sender,
        }
    }

    /// Starts a checkout over the session's cart.
    pub fn checkout_from_cart(
        &self,
        session_id: SessionId,
    ) -> Result<CheckoutOrchestrator, StorefrontError> {
        let items = self.cart.items(session_id)?;
        self.checkout(session_id, items, CheckoutSource::Cart)
    }

    /// Starts a buy-now checkout over an ephemeral item list, bypassing the
    /// session cart.
    pub fn checkout_buy_now(
        &self,
        session_id: SessionId,
        items: Vec<CartLineItem>,
    ) -> Result<CheckoutOrchestrator, StorefrontError> {
        self.checkout(session_id, items, CheckoutSource::BuyNow)
    }

    fn checkout(
        &self,
        session_id: SessionId,
        items: Vec<CartLineItem>,
        source: CheckoutSource,
    ) -> Result<CheckoutOrchestrator, StorefrontError> {
        CheckoutOrchestrator::begin(
            self.backend.clone(),
            self.pricing.clone(),
            self.cart.clone(),
            self.event_sender.clone(),
            session_id,
            items,
            source,
        )
    }

    /// Opens a hamper customizer for a product, pre-filled to the minimum.
    pub async fn customize_hamper(
        &self,
        product: &Product,
    ) -> Result<HamperCustomizer, StorefrontError> {
        let mut customizer = HamperCustomizer::for_product(product, self.event_sender.clone())?;
        customizer.open().await;
        Ok(customizer)
    }
}
