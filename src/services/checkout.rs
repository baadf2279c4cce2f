use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::auth::SessionId;
use crate::client::StorefrontBackend;
use crate::errors::{FieldErrors, StorefrontError};
use crate::events::{Event, EventSender};
use crate::models::{
    CartLineItem, CheckoutSource, CreatedOrder, CustomerDetails, OrderDraft, PaymentMethod,
    PaymentSession, PaymentSessionRequest,
};
use crate::services::cart::CartStore;
use crate::services::pricing::PricingEngine;

/// Checkout progression.
///
/// `Editing → Validating → (PaymentPending | Submitting) → Submitted →
/// {Confirmed | Failed}`. `Validating`, `Submitting` and `Submitted` are
/// transient within a single `submit` call; the states a caller observes
/// between calls are `Editing`, `PaymentPending`, `Confirmed` and `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum CheckoutState {
    Editing,
    Validating,
    PaymentPending,
    Submitting,
    Submitted,
    Confirmed,
    Failed,
}

/// What a successful `submit` produced.
#[derive(Clone, Debug)]
pub enum SubmitOutcome {
    /// Order acknowledged by the backend; checkout is done.
    Confirmed(CreatedOrder),
    /// Pending order created and a payment session opened; the UI should
    /// hand `session` to the payment modal.
    PaymentPending {
        order: CreatedOrder,
        session: PaymentSession,
    },
}

/// Sequences one checkout: validation, optional payment-session creation,
/// order submission and the post-submit side effects.
///
/// The orchestrator owns its draft for the whole flow. A failed submission
/// keeps the draft intact so the user can resubmit without re-entering
/// anything; nothing counts as placed until the backend acknowledges
/// creation. Re-entry while a submission or payment is outstanding is
/// refused: the double-submit guard is an invariant here, not a UI nicety.
pub struct CheckoutOrchestrator {
    backend: Arc<dyn StorefrontBackend>,
    pricing: PricingEngine,
    cart: Arc<CartStore>,
    event_sender: EventSender,
    session_id: SessionId,
    state: CheckoutState,
    draft: OrderDraft,
    field_errors: FieldErrors,
    pending_order: Option<CreatedOrder>,
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("draft", &self.draft)
            .field("field_errors", &self.field_errors)
            .field("pending_order", &self.pending_order)
            .finish_non_exhaustive()
    }
}

impl CheckoutOrchestrator {
    /// Starts a checkout over a non-empty item snapshot.
    ///
    /// The UI redirects away from checkout when there is nothing to buy;
    /// this guard backs that up at the core level.
    pub fn begin(
        backend: Arc<dyn StorefrontBackend>,
        pricing: PricingEngine,
        cart: Arc<CartStore>,
        event_sender: EventSender,
        session_id: SessionId,
        items: Vec<CartLineItem>,
        source: CheckoutSource,
    ) -> Result<Self, StorefrontError> {
        if items.is_empty() {
            return Err(StorefrontError::InvalidOperation(
                "nothing to check out".to_string(),
            ));
        }

        Ok(Self {
            backend,
            pricing,
            cart,
            event_sender,
            session_id,
            state: CheckoutState::Editing,
            draft: OrderDraft::new(items, source),
            field_errors: FieldErrors::new(),
            pending_order: None,
        })
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Field errors from the last validation attempt.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Updates the customer fields. Only allowed while the form is editable.
    pub fn set_customer(&mut self, customer: CustomerDetails) -> Result<(), StorefrontError> {
        self.ensure_editable()?;
        self.draft.customer = customer;
        Ok(())
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), StorefrontError> {
        self.ensure_editable()?;
        self.draft.payment_method = method;
        Ok(())
    }

    /// Validates the draft and submits it.
    ///
    /// COD posts the order directly; online payment first creates the
    /// pending order (the payment session needs its id), then opens a
    /// payment session and parks in `PaymentPending` until
    /// [`payment_completed`](Self::payment_completed) or
    /// [`payment_cancelled`](Self::payment_cancelled).
    #[instrument(skip(self), fields(draft_id = %self.draft.draft_id))]
    pub async fn submit(&mut self) -> Result<SubmitOutcome, StorefrontError> {
        match self.state {
            CheckoutState::Editing | CheckoutState::Failed => {}
            CheckoutState::Confirmed => {
                return Err(StorefrontError::InvalidOperation(
                    "order already confirmed".to_string(),
                ));
            }
            // PaymentPending and the transient states mean a submission is
            // already underway.
            _ => return Err(StorefrontError::SubmissionInProgress),
        }

        self.state = CheckoutState::Validating;
        if let Err(errors) = self.draft.customer.field_errors() {
            self.field_errors = errors.clone();
            self.state = CheckoutState::Editing;
            return Err(StorefrontError::ValidationFailed(errors));
        }
        self.field_errors.clear();

        // Totals are recomputed at submit time so a stale draft can never
        // carry stale money.
        self.draft.totals = self
            .pricing
            .compute_totals(&self.draft.items, Some(self.draft.customer.state.as_str()));

        self.event_sender
            .send_or_log(Event::CheckoutStarted {
                draft_id: self.draft.draft_id,
            })
            .await;

        match self.draft.payment_method {
            PaymentMethod::Cod => self.submit_cod().await,
            PaymentMethod::Online => self.submit_online().await,
        }
    }

    /// Re-runs submission with the preserved draft after a failure.
    pub async fn retry(&mut self) -> Result<SubmitOutcome, StorefrontError> {
        if self.state != CheckoutState::Failed {
            return Err(StorefrontError::InvalidOperation(
                "nothing to retry".to_string(),
            ));
        }
        self.submit().await
    }

    /// Marks the pending online payment as completed.
    #[instrument(skip(self))]
    pub async fn payment_completed(&mut self) -> Result<CreatedOrder, StorefrontError> {
        if self.state != CheckoutState::PaymentPending {
            return Err(StorefrontError::InvalidOperation(
                "no payment in progress".to_string(),
            ));
        }

        let order = self
            .pending_order
            .clone()
            .ok_or_else(|| StorefrontError::Internal("pending order missing".to_string()))?;

        self.state = CheckoutState::Confirmed;
        self.finish_confirmed(&order).await;
        Ok(order)
    }

    /// Returns from the payment modal without paying. The order stays
    /// pending server-side and the cart is left alone.
    #[instrument(skip(self))]
    pub async fn payment_cancelled(&mut self) -> Result<(), StorefrontError> {
        if self.state != CheckoutState::PaymentPending {
            return Err(StorefrontError::InvalidOperation(
                "no payment in progress".to_string(),
            ));
        }

        self.state = CheckoutState::Editing;
        self.event_sender
            .send_or_log(Event::PaymentCancelled {
                draft_id: self.draft.draft_id,
            })
            .await;

        info!("payment cancelled, back to editing");
        Ok(())
    }

    async fn submit_cod(&mut self) -> Result<SubmitOutcome, StorefrontError> {
        self.state = CheckoutState::Submitting;

        match self.backend.create_order(&self.draft).await {
            Ok(order) => {
                self.state = CheckoutState::Submitted;
                self.event_sender
                    .send_or_log(Event::OrderSubmitted {
                        draft_id: self.draft.draft_id,
                    })
                    .await;

                self.state = CheckoutState::Confirmed;
                self.finish_confirmed(&order).await;
                Ok(SubmitOutcome::Confirmed(order))
            }
            Err(err) => {
                self.state = CheckoutState::Failed;
                self.event_sender
                    .send_or_log(Event::OrderSubmissionFailed {
                        draft_id: self.draft.draft_id,
                        reason: err.to_string(),
                    })
                    .await;

                warn!("order submission failed: {}", err);
                Err(err)
            }
        }
    }

    async fn submit_online(&mut self) -> Result<SubmitOutcome, StorefrontError> {
        // Create the pending order first; the payment session needs an
        // order id to reference.
        let order = match self.backend.create_order(&self.draft).await {
            Ok(order) => order,
            Err(err) => {
                // No payment modal, no cart mutation; the form stays live.
                self.state = CheckoutState::Editing;
                self.event_sender
                    .send_or_log(Event::OrderSubmissionFailed {
                        draft_id: self.draft.draft_id,
                        reason: err.to_string(),
                    })
                    .await;

                warn!("pending-order creation failed: {}", err);
                return Err(err);
            }
        };

        let request = PaymentSessionRequest {
            amount: self.draft.totals.total,
            order_id: order.id.clone(),
            customer_name: self.draft.customer.name.clone(),
            customer_email: self.draft.customer.email.clone(),
            customer_phone: self.draft.customer.phone.clone(),
        };

        match self.backend.create_payment_session(&request).await {
            Ok(session) => {
                self.state = CheckoutState::PaymentPending;
                self.pending_order = Some(order.clone());
                self.event_sender
                    .send_or_log(Event::PaymentSessionOpened {
                        order_id: order.id.clone(),
                    })
                    .await;

                info!(order_id = %order.id, "payment session opened");
                Ok(SubmitOutcome::PaymentPending { order, session })
            }
            Err(err) => {
                // The order stays pending server-side; control returns to
                // the user, who may retry or switch to COD themselves.
                self.state = CheckoutState::Editing;
                self.event_sender
                    .send_or_log(Event::PaymentFailed {
                        order_id: order.id.clone(),
                        reason: err.to_string(),
                    })
                    .await;

                warn!(order_id = %order.id, "payment session failed: {}", err);
                Err(StorefrontError::PaymentProvider(err.to_string()))
            }
        }
    }

    async fn finish_confirmed(&mut self, order: &CreatedOrder) {
        if self.draft.source == CheckoutSource::Cart {
            if let Err(err) = self.cart.clear(self.session_id).await {
                warn!("failed to clear cart after checkout: {}", err);
            }
        }

        self.event_sender
            .send_or_log(Event::OrderConfirmed {
                order_id: order.id.clone(),
                email_sent: order.email_sent,
            })
            .await;

        info!(order_id = %order.id, "order confirmed");
    }

    fn ensure_editable(&self) -> Result<(), StorefrontError> {
        match self.state {
            CheckoutState::Editing | CheckoutState::Failed => Ok(()),
            CheckoutState::PaymentPending => Err(StorefrontError::SubmissionInProgress),
            _ => Err(StorefrontError::InvalidOperation(format!(
                "draft is not editable in state {}",
                self.state
            ))),
        }
    }
}
