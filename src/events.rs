use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::SessionId;

/// Sender half for publishing domain events.
///
/// Cloned freely into services; the receiving end is normally drained by
/// [`process_events`] spawned at startup.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Convenience constructor returning both halves.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the receiver is gone.
    /// Event publication must never break a storefront operation.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

// The externally visible mutations of the storefront, published for the UI
// layer (toasts, badges) and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartItemAdded {
        session_id: SessionId,
        product_id: Uuid,
        quantity: u32,
    },
    CartItemUpdated {
        session_id: SessionId,
        product_id: Uuid,
        quantity: u32,
    },
    CartItemRemoved {
        session_id: SessionId,
        product_id: Uuid,
    },
    CartCleared {
        session_id: SessionId,
    },

    // Hamper events
    HamperOpened {
        product_id: Uuid,
        topped_up: u32,
    },
    HamperCommitted {
        product_id: Uuid,
        total_packets: u32,
    },

    // Checkout events
    CheckoutStarted {
        draft_id: Uuid,
    },
    OrderSubmitted {
        draft_id: Uuid,
    },
    OrderConfirmed {
        order_id: String,
        email_sent: bool,
    },
    OrderSubmissionFailed {
        draft_id: Uuid,
        reason: String,
    },

    // Payment events
    PaymentSessionOpened {
        order_id: String,
    },
    PaymentFailed {
        order_id: String,
        reason: String,
    },
    PaymentCancelled {
        draft_id: Uuid,
    },
}

/// Drains the event channel, logging each event. Spawned from the binary;
/// a real UI shell would fan these out to its notification surface instead.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        debug!(?event, "storefront event");
    }
    debug!("event channel closed");
}
