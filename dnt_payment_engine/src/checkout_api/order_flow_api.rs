use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    db_types::{Member, NewOrder, NewSubscription, Order, OrderStatusType, Product, Subscription},
    events::{EventProducers, ReceiptReadyEvent},
    order_objects::VerifyOutcome,
    traits::{AuthorizedCharge, GatewayCustomer, GatewayError, PaymentEngineError, PaymentGateway,
        PaymentGatewayDatabase},
};

/// Message shown when replaying a verify call against an order that already failed.
const PAYMENT_FAILED_MESSAGE: &str = "Payment failed. Please try again.";

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Public base URL of the server, used to build the per-order gateway return URL.
    pub public_url: String,
}

impl CheckoutConfig {
    pub fn new(public_url: &str) -> Self {
        Self { public_url: public_url.trim_end_matches('/').to_string() }
    }

    /// The callback URL the gateway redirects the user to after 3-D Secure. Unique per order.
    pub fn verify_url(&self, order_id: i64) -> String {
        format!("{}/orders/{order_id}/verify", self.public_url)
    }
}

/// `OrderFlowApi` is the order/payment state machine: it coordinates the external two-phase
/// charge (authorize → user redirect → capture) with local order state, subscription
/// provisioning, receipt numbering and cart recovery.
///
/// Every gateway failure is a terminal local decision: the order is cancelled within the same
/// call and the error is surfaced to the caller. There are no automatic gateway retries.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
    config: CheckoutConfig,
    producers: EventProducers,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G, config: CheckoutConfig, producers: EventProducers) -> Self {
        Self { db, gateway, config, producers }
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    /// Starts a checkout for the product in the member's cart.
    ///
    /// Persists a `Pending` order with its line item, opens (or reuses) the gateway customer for
    /// the member's email, attaches the card token, and opens an authorize-only charge with a
    /// return URL unique to the new order. Returns the URL the user's browser must be redirected
    /// to for out-of-band authorization.
    ///
    /// If the gateway rejects any step, the order is moved to `Cancelled` before the error is
    /// returned; a failed authorization never leaves an order `Pending`.
    pub async fn checkout(&self, member_id: i64, payment_token: &str) -> Result<String, PaymentEngineError> {
        let member =
            self.db.fetch_member(member_id).await?.ok_or(PaymentEngineError::MemberNotFound(member_id))?;
        let product =
            self.db.cart_product_for_member(member_id).await?.ok_or(PaymentEngineError::NoProductInCart)?;
        let order = self.db.insert_order(NewOrder::new(member_id, product.id, product.price)).await?;
        debug!("🛒️ Order #{} created for member #{member_id} ({} at {})", order.id, product.title, order.total);

        let return_url = self.config.verify_url(order.id);
        match self.authorize(&member, &order, payment_token, &return_url).await {
            Ok((customer, charge)) => {
                if member.gateway_customer_id.as_deref() != Some(customer.customer_id.as_str()) {
                    self.db.save_gateway_customer_id(member_id, &customer.customer_id).await?;
                }
                self.db.attach_charge_id(order.id, &charge.charge_id).await?;
                debug!("🛒️ Order #{} authorized as charge [{}]. Redirecting user.", order.id, charge.charge_id);
                Ok(charge.authorize_url)
            },
            Err(e) => {
                warn!("🛒️ Authorization for order #{} failed: {e}. Cancelling the order.", order.id);
                if let Err(db_err) = self.db.finalize_order(order.id, OrderStatusType::Cancelled).await {
                    error!("🛒️ Could not cancel order #{} after a failed authorization: {db_err}", order.id);
                }
                Err(e.into())
            },
        }
    }

    async fn authorize(
        &self,
        member: &Member,
        order: &Order,
        payment_token: &str,
        return_url: &str,
    ) -> Result<(GatewayCustomer, AuthorizedCharge), GatewayError> {
        let customer = self
            .gateway
            .prepare_customer(member.gateway_customer_id.as_deref(), &member.email, payment_token)
            .await?;
        let charge = self.gateway.authorize_charge(order.total, &customer, return_url).await?;
        Ok((customer, charge))
    }

    /// Completes (or fails) an order after the user returns from the gateway's authorization
    /// step. Captures the authorized charge and drives the order to its terminal state.
    ///
    /// Calling `verify` again on an order that is already terminal is a no-op: the stored outcome
    /// is replayed without another gateway call, so neither a double capture nor a duplicate
    /// cart-recovery can occur.
    pub async fn verify(&self, order_id: i64) -> Result<VerifyOutcome, PaymentEngineError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(PaymentEngineError::OrderNotFound(order_id))?;
        if let Some(outcome) = Self::terminal_outcome(&order) {
            debug!("🔄️ Verify replayed for terminal order #{order_id} ({})", order.status);
            return Ok(outcome);
        }
        let Some(charge_id) = order.charge_id.clone() else {
            // Checkout never opened a charge for this order; there is nothing to capture.
            warn!("🔄️ Order #{order_id} has no charge session. Cancelling.");
            return self.fail_order(order).await;
        };

        match self.gateway.capture_charge(&charge_id).await {
            Ok(capture) if capture.paid => self.complete_order(order).await,
            Ok(capture) => {
                info!("🔄️ Charge [{charge_id}] for order #{order_id} reported unpaid after capture");
                self.fail_order_with_message(order, capture.message).await
            },
            Err(e) => {
                warn!("🔄️ Capture of charge [{charge_id}] for order #{order_id} failed: {e}");
                self.fail_order_with_message(order, Some(e.to_string())).await
            },
        }
    }

    fn terminal_outcome(order: &Order) -> Option<VerifyOutcome> {
        match order.status {
            OrderStatusType::Paid => Some(VerifyOutcome::Completed { order: order.clone() }),
            OrderStatusType::Cancelled => {
                Some(VerifyOutcome::PaymentFailed { message: PAYMENT_FAILED_MESSAGE.to_string() })
            },
            OrderStatusType::Pending => None,
        }
    }

    async fn fail_order(&self, order: Order) -> Result<VerifyOutcome, PaymentEngineError> {
        self.fail_order_with_message(order, None).await
    }

    /// Cancels a pending order and restores the member's cart so the purchase can be retried.
    async fn fail_order_with_message(
        &self,
        order: Order,
        message: Option<String>,
    ) -> Result<VerifyOutcome, PaymentEngineError> {
        let order = match self.db.finalize_order(order.id, OrderStatusType::Cancelled).await {
            Ok(order) => order,
            Err(PaymentEngineError::OrderAlreadyFinalized(_)) => {
                // A concurrent verify won the transition; replay its outcome without touching the
                // cart again.
                return self.replay(order.id).await;
            },
            Err(e) => return Err(e),
        };
        let product = self.db.product_for_order(order.id).await?;
        self.db.recover_cart(order.member_id, product.id).await?;
        debug!("🔄️ Order #{} cancelled; cart restored with product #{} for member #{}", order.id, product.id,
            order.member_id);
        let message = message.map_or_else(|| PAYMENT_FAILED_MESSAGE.to_string(), |m| format!("Payment failed: {m}"));
        Ok(VerifyOutcome::PaymentFailed { message })
    }

    /// Marks a pending order as paid and runs the post-payment pipeline: subscription
    /// provisioning, receipt numbering, receipt email dispatch and cart clearing.
    async fn complete_order(&self, order: Order) -> Result<VerifyOutcome, PaymentEngineError> {
        let order = match self.db.finalize_order(order.id, OrderStatusType::Paid).await {
            Ok(order) => order,
            Err(PaymentEngineError::OrderAlreadyFinalized(_)) => return self.replay(order.id).await,
            Err(e) => return Err(e),
        };
        info!("🔄️ Order #{} is paid", order.id);
        let product = self.db.product_for_order(order.id).await?;
        let subscription = match self.provision(&order, &product).await {
            Ok(sub) => sub,
            Err(e) => {
                // The payment is captured and must never be silently lost. The order stays Paid
                // and the condition is surfaced for manual reconciliation.
                error!("🔄️ Payment for order #{} succeeded but provisioning failed: {e}", order.id);
                return Ok(VerifyOutcome::SubscriptionFailed { order });
            },
        };
        debug!("🔄️ Subscription #{} provisioned for order #{} ({} to {})", subscription.id, order.id,
            subscription.start_date, subscription.end_date);
        let receipt_number = self.db.allocate_receipt_number(order.id).await?;
        let member =
            self.db.fetch_member(order.member_id).await?.ok_or(PaymentEngineError::MemberNotFound(order.member_id))?;
        self.call_receipt_ready_hook(&order, &product, &subscription, &receipt_number, &member.email).await;
        self.db.mark_receipt_sent(order.id).await?;
        self.db.clear_cart(order.member_id).await?;
        let order = self.db.fetch_order(order.id).await?.ok_or(PaymentEngineError::OrderNotFound(order.id))?;
        Ok(VerifyOutcome::Completed { order })
    }

    /// Computes the subscription period from the product plan and the payment timestamp, and
    /// creates exactly one subscription for the order.
    async fn provision(&self, order: &Order, product: &Product) -> Result<Subscription, PaymentEngineError> {
        // paid_at is stamped by the Paid transition; updated_at is a safe stand-in.
        let start_date = order.paid_at.unwrap_or(order.updated_at).date_naive();
        let end_date = start_date + Duration::days(product.duration_days.max(1) - 1);
        let subscription = NewSubscription {
            member_id: order.member_id,
            order_id: order.id,
            start_date,
            end_date,
            auto_renew: product.auto_renew,
        };
        self.db.create_subscription(subscription).await
    }

    async fn replay(&self, order_id: i64) -> Result<VerifyOutcome, PaymentEngineError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(PaymentEngineError::OrderNotFound(order_id))?;
        Self::terminal_outcome(&order).ok_or(PaymentEngineError::OrderAlreadyFinalized(order_id))
    }

    async fn call_receipt_ready_hook(
        &self,
        order: &Order,
        product: &Product,
        subscription: &Subscription,
        receipt_number: &crate::db_types::ReceiptNumber,
        member_email: &str,
    ) {
        for emitter in &self.producers.receipt_ready_producer {
            debug!("🔄️📬️ Notifying receipt-ready hook subscribers for order #{}", order.id);
            let event = ReceiptReadyEvent {
                order: order.clone(),
                product: product.clone(),
                subscription: subscription.clone(),
                receipt_number: receipt_number.clone(),
                member_email: member_email.to_string(),
            };
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
