//! Typed client for the storefront's REST backend.
//!
//! The backend is a black box behind four endpoints; everything the core
//! needs goes through [`StorefrontBackend`] so flows can be exercised
//! against test doubles.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::errors::StorefrontError;
use crate::models::{CreatedOrder, OrderDraft, PaymentSession, PaymentSessionRequest, Product};

/// The storefront's view of the backend.
#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// `POST /orders`
    async fn create_order(&self, draft: &OrderDraft) -> Result<CreatedOrder, StorefrontError>;

    /// `POST /payment/create`
    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, StorefrontError>;

    /// `GET /products/:id`
    async fn get_product(&self, id: Uuid) -> Result<Product, StorefrontError>;

    /// `GET /products`
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError>;
}

/// `reqwest`-backed implementation.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StorefrontError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StorefrontError::Internal(format!("invalid backend url: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorefrontError::Internal(format!("http client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &StorefrontConfig) -> Result<Self, StorefrontError> {
        Self::new(
            &config.backend_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> Url {
        // Url::join treats a base without a trailing slash as a file and
        // would drop its last segment, so splice the paths by hand.
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StorefrontError> {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StorefrontError> {
        let response = self.client.get(self.endpoint(path)).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StorefrontError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::backend_error(status, message));
        }
        Ok(response.json::<T>().await?)
    }

    fn backend_error(status: StatusCode, message: String) -> StorefrontError {
        StorefrontError::Backend {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl StorefrontBackend for HttpBackend {
    #[instrument(skip(self, draft), fields(draft_id = %draft.draft_id))]
    async fn create_order(&self, draft: &OrderDraft) -> Result<CreatedOrder, StorefrontError> {
        self.post_json("orders", draft).await
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, StorefrontError> {
        self.post_json("payment/create", request).await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: Uuid) -> Result<Product, StorefrontError> {
        self.get_json(&format!("products/{}", id)).await
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError> {
        self.get_json("products").await
    }
}
