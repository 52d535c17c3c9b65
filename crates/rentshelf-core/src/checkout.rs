//! # Checkout Flow
//!
//! State machine that walks a shopper from the cart to a recorded order.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────┐ signed in, items ┌──────────┐ details valid ┌─────────────┐   │
//! │  │ Cart │ ───────────────► │ Shipping │ ────────────► │   Payment   │   │
//! │  └──────┘ ◄───── back ──── └──────────┘ ◄──── back ── └──────┬──────┘   │
//! │     ▲                                                        │          │
//! │     │                        begin_payment (in_flight = true)│          │
//! │     │                                                        ▼          │
//! │     │                      payment_failed ──► Payment (retry allowed)   │
//! │     │                      payment_succeeded ──► Finalizing             │
//! │     │                                               │                   │
//! │     │                           order_recorded ◄────┴────► order_failed │
//! │     │                                  │                       │        │
//! │     │                                  ▼                       ▼        │
//! │     └────────── reset ─────────── Confirmed          SupportRequired    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flow never touches the cart. The caller clears it after
//! [`CheckoutFlow::order_recorded`], and only then.
//!
//! Once capture has started the flow cannot be cancelled. A capture that
//! succeeded but whose order was not stored ends in `SupportRequired`; the
//! flow never asks for payment again from there.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::CartStore;
use crate::error::{CoreError, ValidationError};
use crate::order::NewOrder;
use crate::ports::{PaymentFailure, PaymentReceipt, PaymentRequest};
use crate::types::{Identity, RentedBook, ShippingDetails};
use crate::validation::validate_shipping_details;

// =============================================================================
// Errors
// =============================================================================

/// Why a checkout step was refused.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Shopper must sign in first. The cart is kept.
    #[error("Please sign in to continue to checkout")]
    AuthenticationRequired,

    #[error("Your cart is empty")]
    EmptyCart,

    /// Shipping details incomplete. The entered values are kept.
    #[error("Invalid shipping details: {0}")]
    Validation(#[from] ValidationError),

    /// The action does not apply to the current step.
    #[error("Cannot {action} while in the {step} step")]
    InvalidStep { action: String, step: String },

    /// A capture is already running for this session.
    #[error("A payment is already in progress")]
    PaymentInProgress,

    /// Capture failed or was dismissed. Retry is allowed.
    #[error("Payment failed: {reason}")]
    PaymentCaptureFailed { reason: String },

    /// Payment was captured but the order was not stored.
    ///
    /// Terminal: retrying could charge the shopper twice.
    #[error("Payment {payment_reference} was received but the order could not be recorded. Please contact support.")]
    OrderNotRecorded { payment_reference: String },

    #[error("Checkout can no longer be cancelled")]
    CannotCancel,

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for checkout results.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Steps
// =============================================================================

/// Current position in the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum CheckoutStep {
    #[default]
    Cart,
    Shipping,
    Payment {
        in_flight: bool,
    },
    Finalizing {
        payment_reference: String,
    },
    Confirmed {
        order_id: String,
    },
    SupportRequired {
        payment_reference: String,
    },
}

impl CheckoutStep {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "cart",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment { .. } => "payment",
            CheckoutStep::Finalizing { .. } => "finalizing",
            CheckoutStep::Confirmed { .. } => "confirmed",
            CheckoutStep::SupportRequired { .. } => "support-required",
        }
    }

    /// `Confirmed` and `SupportRequired` end the flow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckoutStep::Confirmed { .. } | CheckoutStep::SupportRequired { .. }
        )
    }
}

// =============================================================================
// Checkout Flow
// =============================================================================

/// One shopper's checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFlow {
    step: CheckoutStep,
    shipping: Option<ShippingDetails>,
    currency: String,
}

impl CheckoutFlow {
    /// Starts at the cart step, charging in `currency` (ISO 4217).
    pub fn new(currency: impl Into<String>) -> Self {
        CheckoutFlow {
            step: CheckoutStep::Cart,
            shipping: None,
            currency: currency.into(),
        }
    }

    pub fn step(&self) -> &CheckoutStep {
        &self.step
    }

    /// Last accepted shipping details, kept across back/retry.
    pub fn shipping(&self) -> Option<&ShippingDetails> {
        self.shipping.as_ref()
    }

    /// `Cart → Shipping`.
    ///
    /// ## Errors
    /// - `AuthenticationRequired` when no shopper is signed in; stays in `Cart`
    /// - `EmptyCart` when there is nothing to rent; resets to `Cart`
    pub fn proceed_to_shipping(
        &mut self,
        cart: &CartStore,
        identity: Option<&Identity>,
    ) -> CheckoutResult<()> {
        self.expect_step(matches!(self.step, CheckoutStep::Cart), "proceed to shipping")?;

        if identity.is_none() {
            return Err(CheckoutError::AuthenticationRequired);
        }
        if cart.is_empty() {
            self.step = CheckoutStep::Cart;
            return Err(CheckoutError::EmptyCart);
        }

        self.step = CheckoutStep::Shipping;
        Ok(())
    }

    /// `Shipping → Payment` once every required field is filled.
    ///
    /// An invalid submission changes nothing.
    pub fn submit_shipping(&mut self, details: ShippingDetails) -> CheckoutResult<()> {
        self.expect_step(matches!(self.step, CheckoutStep::Shipping), "submit shipping details")?;

        validate_shipping_details(&details)?;

        self.shipping = Some(details);
        self.step = CheckoutStep::Payment { in_flight: false };
        Ok(())
    }

    /// `Shipping → Cart` or `Payment → Shipping`. View change only.
    pub fn back(&mut self) -> CheckoutResult<()> {
        self.step = match self.step {
            CheckoutStep::Shipping => CheckoutStep::Cart,
            CheckoutStep::Payment { in_flight: false } => CheckoutStep::Shipping,
            CheckoutStep::Payment { in_flight: true } => {
                return Err(CheckoutError::PaymentInProgress)
            }
            _ => return Err(self.invalid_step("go back")),
        };
        Ok(())
    }

    /// Marks a capture as in flight and returns what to charge.
    ///
    /// ## Errors
    /// - `PaymentInProgress` for a second "Pay Now" while one is running
    /// - `EmptyCart` if the cart was emptied meanwhile
    pub fn begin_payment(
        &mut self,
        cart: &CartStore,
        identity: &Identity,
    ) -> CheckoutResult<PaymentRequest> {
        match self.step {
            CheckoutStep::Payment { in_flight: false } => {}
            CheckoutStep::Payment { in_flight: true } => {
                return Err(CheckoutError::PaymentInProgress)
            }
            _ => return Err(self.invalid_step("start payment")),
        }

        let shipping = self
            .shipping
            .as_ref()
            .ok_or_else(|| ValidationError::required("shipping_details"))?;
        let snapshot = cart.snapshot()?;
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let request = PaymentRequest {
            amount: snapshot.total_amount,
            currency: self.currency.clone(),
            shopper_email: identity.email.clone(),
            shopper_name: shipping.full_name.trim().to_string(),
        };

        self.step = CheckoutStep::Payment { in_flight: true };
        Ok(request)
    }

    /// Capture failed or was dismissed: back to `Payment` for a retry.
    ///
    /// Returns the error to show the shopper.
    pub fn payment_failed(&mut self, failure: PaymentFailure) -> CheckoutError {
        if self.step != (CheckoutStep::Payment { in_flight: true }) {
            return self.invalid_step("record a payment failure");
        }

        self.step = CheckoutStep::Payment { in_flight: false };
        CheckoutError::PaymentCaptureFailed {
            reason: failure.to_string(),
        }
    }

    /// Capture succeeded: freezes the cart into an order request and moves
    /// to `Finalizing`.
    ///
    /// If the request cannot be built the flow ends in `SupportRequired`,
    /// since the money has already been taken.
    pub fn payment_succeeded(
        &mut self,
        receipt: PaymentReceipt,
        cart: &CartStore,
        identity: &Identity,
    ) -> CheckoutResult<NewOrder> {
        self.expect_step(
            matches!(self.step, CheckoutStep::Payment { in_flight: true }),
            "confirm a payment",
        )?;

        let payment_reference = receipt.payment_reference;
        self.step = CheckoutStep::Finalizing {
            payment_reference: payment_reference.clone(),
        };

        match self.build_order(&payment_reference, cart, identity) {
            Ok(new_order) => Ok(new_order),
            Err(_) => Err(self.order_failed()),
        }
    }

    /// Clears the in-flight flag of a capture whose outcome will never be
    /// reported, e.g. because the caller stopped waiting for it.
    ///
    /// Same end state as a dismissed payment: back to `Payment` for a retry.
    pub fn abandon_payment(&mut self) -> CheckoutResult<()> {
        self.expect_step(
            matches!(self.step, CheckoutStep::Payment { in_flight: true }),
            "abandon a payment",
        )?;

        self.step = CheckoutStep::Payment { in_flight: false };
        Ok(())
    }

    /// `Finalizing → Confirmed` once the order is stored.
    pub fn order_recorded(&mut self, order_id: impl Into<String>) -> CheckoutResult<()> {
        self.expect_step(
            matches!(self.step, CheckoutStep::Finalizing { .. }),
            "confirm an order",
        )?;

        self.step = CheckoutStep::Confirmed {
            order_id: order_id.into(),
        };
        Ok(())
    }

    /// `Finalizing → SupportRequired`. Returns the error to show the shopper.
    pub fn order_failed(&mut self) -> CheckoutError {
        let payment_reference = match &self.step {
            CheckoutStep::Finalizing { payment_reference }
            | CheckoutStep::SupportRequired { payment_reference } => payment_reference.clone(),
            _ => return self.invalid_step("record an order failure"),
        };

        self.step = CheckoutStep::SupportRequired {
            payment_reference: payment_reference.clone(),
        };
        CheckoutError::OrderNotRecorded { payment_reference }
    }

    /// Abandons checkout before capture starts. Shipping details are kept.
    pub fn cancel(&mut self) -> CheckoutResult<()> {
        match self.step {
            CheckoutStep::Cart | CheckoutStep::Shipping | CheckoutStep::Payment { in_flight: false } => {
                self.step = CheckoutStep::Cart;
                Ok(())
            }
            _ => Err(CheckoutError::CannotCancel),
        }
    }

    /// Starts over after a terminal step.
    pub fn reset(&mut self) -> CheckoutResult<()> {
        if !self.step.is_terminal() && self.step != CheckoutStep::Cart {
            return Err(self.invalid_step("reset checkout"));
        }

        self.step = CheckoutStep::Cart;
        self.shipping = None;
        Ok(())
    }

    fn build_order(
        &self,
        payment_reference: &str,
        cart: &CartStore,
        identity: &Identity,
    ) -> CheckoutResult<NewOrder> {
        let shipping = self
            .shipping
            .as_ref()
            .ok_or_else(|| ValidationError::required("shipping_details"))?;
        let snapshot = cart.snapshot()?;

        let books = snapshot
            .lines
            .iter()
            .map(|priced| RentedBook::snapshot(&priced.line.item, priced.line.rental_days))
            .collect::<Result<Vec<_>, _>>()?;

        let new_order = NewOrder {
            shopper_id: identity.uid.clone(),
            shopper_email: identity.email.clone(),
            shopper_name: shipping.full_name.trim().to_string(),
            books,
            total_amount: snapshot.total_amount,
            delivery_address: shipping.delivery_address(),
            payment_reference: Some(payment_reference.to_string()),
        };
        new_order.validate()?;
        Ok(new_order)
    }

    fn expect_step(&self, ok: bool, action: &str) -> CheckoutResult<()> {
        if ok {
            Ok(())
        } else {
            Err(self.invalid_step(action))
        }
    }

    fn invalid_step(&self, action: &str) -> CheckoutError {
        CheckoutError::InvalidStep {
            action: action.to_string(),
            step: self.step.name().to_string(),
        }
    }
}
