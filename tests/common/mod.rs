#![allow(dead_code)]

use std::sync::Arc;

use mockall::mock;
use rust_decimal::Decimal;
use uuid::Uuid;

use storefront_core::auth::SessionId;
use storefront_core::client::StorefrontBackend;
use storefront_core::config::StorefrontConfig;
use storefront_core::errors::StorefrontError;
use storefront_core::events::EventSender;
use storefront_core::models::{
    CreatedOrder, CustomerDetails, OrderDraft, OrderStatus, PaymentSession, PaymentSessionRequest,
    Product,
};
use storefront_core::Storefront;

mock! {
    pub Backend {}

    #[async_trait::async_trait]
    impl StorefrontBackend for Backend {
        async fn create_order(&self, draft: &OrderDraft) -> Result<CreatedOrder, StorefrontError>;

        async fn create_payment_session(
            &self,
            request: &PaymentSessionRequest,
        ) -> Result<PaymentSession, StorefrontError>;

        async fn get_product(&self, id: Uuid) -> Result<Product, StorefrontError>;

        async fn list_products(&self) -> Result<Vec<Product>, StorefrontError>;
    }
}

/// A wired storefront over a given backend double, with one signed-in
/// session ready to shop.
pub struct TestHarness {
    pub storefront: Storefront,
    pub session: SessionId,
}

pub fn harness(backend: MockBackend) -> TestHarness {
    let (event_sender, _rx) = EventSender::channel(256);
    let storefront = Storefront::new(
        StorefrontConfig::default(),
        Arc::new(backend),
        event_sender,
    );

    let session = storefront.sessions.start_session();
    storefront
        .sessions
        .sign_in(session, Uuid::new_v4(), "asha@example.com");

    TestHarness {
        storefront,
        session,
    }
}

pub fn product(name: &str, price: Decimal, stock: u32) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        unit_price: price,
        original_price: None,
        stock,
        category: "snacks".to_string(),
        image_url: None,
        hamper: None,
    }
}

pub fn valid_customer(state: &str) -> CustomerDetails {
    CustomerDetails {
        name: "Asha Patel".to_string(),
        email: "asha@example.com".to_string(),
        phone: "+91 98765 43210".to_string(),
        address: "14 Ring Road, Rajkot".to_string(),
        state: state.to_string(),
    }
}

pub fn created_order(id: &str) -> CreatedOrder {
    CreatedOrder {
        id: id.to_string(),
        status: OrderStatus::Pending,
        email_sent: true,
    }
}

pub fn payment_session(id: &str) -> PaymentSession {
    PaymentSession {
        payment_session_id: Some(id.to_string()),
        payment_link: None,
    }
}

pub fn network_error() -> StorefrontError {
    StorefrontError::Network("connection reset by peer".to_string())
}
