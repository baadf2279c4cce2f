use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::cart::CartLineItem;
use crate::errors::FieldErrors;

lazy_static! {
    /// Digits, spaces, dashes and plus signs, at least ten characters.
    static ref PHONE_RE: Regex = Regex::new(r"^[\d\s\-+]{10,}$").expect("valid phone regex");
}

/// Enum representing the payment methods offered at checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// Online payment through the payment-session provider.
    Online,
}

/// Enum representing the possible statuses of an order.
///
/// The client only ever creates orders in `Pending`; every later transition
/// is performed server-side and merely echoed back here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Where a checkout's items came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum CheckoutSource {
    /// The persistent session cart; cleared after a confirmed order.
    Cart,
    /// An ephemeral buy-now item list; the session cart is left untouched.
    BuyNow,
}

/// Customer-entered checkout fields.
///
/// Validation rules match the checkout form: non-empty name, RFC-shape
/// email, phone of at least ten digit-ish characters, non-empty address and
/// delivery state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomerDetails {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
    #[validate(regex(path = "PHONE_RE", message = "enter a valid phone number"))]
    pub phone: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "delivery state is required"))]
    pub state: String,
}

impl CustomerDetails {
    /// Runs the derive-based rules and flattens the outcome into one message
    /// per field, keyed by field name.
    pub fn field_errors(&self) -> Result<(), FieldErrors> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => {
                let mut flat = FieldErrors::new();
                for (field, field_errors) in errors.field_errors() {
                    if let Some(first) = field_errors.first() {
                        let message = first
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| first.code.to_string());
                        flat.insert(field.to_string(), message);
                    }
                }
                Err(flat)
            }
        }
    }
}

/// Computed money breakdown for a cart or order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub delivery_charge: Decimal,
    /// Always zero under current rules; kept live for forward compatibility.
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            delivery_charge: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// A client-side order draft, submitted once to the order-creation endpoint.
///
/// The draft stays mutable while checkout is in `Editing`; after the backend
/// acknowledges creation only server-side status transitions apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Client-generated draft identifier; the backend assigns its own id.
    pub draft_id: Uuid,
    pub customer: CustomerDetails,
    pub payment_method: PaymentMethod,
    pub items: Vec<CartLineItem>,
    pub totals: OrderTotals,
    pub status: OrderStatus,
    pub source: CheckoutSource,
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    pub fn new(items: Vec<CartLineItem>, source: CheckoutSource) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            customer: CustomerDetails::default(),
            payment_method: PaymentMethod::Cod,
            items,
            totals: OrderTotals::zero(),
            status: OrderStatus::Pending,
            source,
            created_at: Utc::now(),
        }
    }
}

/// Response of `POST /orders`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatedOrder {
    /// Server-assigned order identifier.
    pub id: String,
    pub status: OrderStatus,
    #[serde(rename = "emailSent")]
    pub email_sent: bool,
}

/// Request body of `POST /payment/create`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentSessionRequest {
    pub amount: Decimal,
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

/// Response of `POST /payment/create`. At least one of the two handles is
/// present; which one depends on the provider integration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
}

impl PaymentSession {
    pub fn has_handle(&self) -> bool {
        self.payment_session_id.is_some() || self.payment_link.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_customer() -> CustomerDetails {
        CustomerDetails {
            name: "Asha Patel".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "14 Ring Road, Rajkot".to_string(),
            state: "Gujarat".to_string(),
        }
    }

    // ==================== Customer Validation Tests ====================

    #[test]
    fn test_valid_customer_passes() {
        assert!(valid_customer().field_errors().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut customer = valid_customer();
        customer.name = String::new();

        let errors = customer.field_errors().unwrap_err();
        assert_eq!(
            errors.get("name").map(String::as_str),
            Some("name is required")
        );
    }

    #[test]
    fn test_malformed_email_rejected() {
        let mut customer = valid_customer();
        customer.email = "not-an-email".to_string();

        let errors = customer.field_errors().unwrap_err();
        assert!(errors.contains_key("email"));
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut customer = valid_customer();
        customer.phone = "12345".to_string();

        let errors = customer.field_errors().unwrap_err();
        assert!(errors.contains_key("phone"));
    }

    #[test]
    fn test_phone_with_letters_rejected() {
        let mut customer = valid_customer();
        customer.phone = "98765abc43210".to_string();

        assert!(customer.field_errors().is_err());
    }

    #[test]
    fn test_phone_with_spaces_and_dashes_accepted() {
        let mut customer = valid_customer();
        customer.phone = "987-654-3210".to_string();

        assert!(customer.field_errors().is_ok());
    }

    #[test]
    fn test_missing_state_reported_per_field() {
        let mut customer = valid_customer();
        customer.state = String::new();
        customer.address = String::new();

        let errors = customer.field_errors().unwrap_err();
        assert!(errors.contains_key("state"));
        assert!(errors.contains_key("address"));
        assert!(!errors.contains_key("name"));
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cod).expect("serialize"),
            "\"cod\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Online).expect("serialize"),
            "\"online\""
        );
    }

    #[test]
    fn test_order_status_display() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::Confirmed.to_string(), "confirmed");
    }

    #[test]
    fn test_created_order_email_sent_field_name() {
        let json = r#"{"id": "ord_42", "status": "pending", "emailSent": true}"#;
        let order: CreatedOrder = serde_json::from_str(json).expect("deserialize");

        assert_eq!(order.id, "ord_42");
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.email_sent);
    }

    #[test]
    fn test_payment_session_handle_detection() {
        let empty = PaymentSession::default();
        assert!(!empty.has_handle());

        let with_session = PaymentSession {
            payment_session_id: Some("sess_1".to_string()),
            payment_link: None,
        };
        assert!(with_session.has_handle());

        let with_link = PaymentSession {
            payment_session_id: None,
            payment_link: Some("https://pay.example.com/x".to_string()),
        };
        assert!(with_link.has_handle());
    }

    #[test]
    fn test_new_draft_starts_pending() {
        let draft = OrderDraft::new(Vec::new(), CheckoutSource::Cart);
        assert_eq!(draft.status, OrderStatus::Pending);
        assert_eq!(draft.totals, OrderTotals::zero());
        assert_eq!(draft.payment_method, PaymentMethod::Cod);
    }
}
