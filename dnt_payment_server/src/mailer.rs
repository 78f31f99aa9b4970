//! Receipt email delivery.
//!
//! Only the boundary lives here: the checkout flow hands a rendered receipt to a
//! [`ReceiptMailer`] and moves on. Delivery failures are logged by the caller and never surface
//! to the member. The default implementation logs instead of sending; a real SMTP transport can
//! be slotted in without touching the order flow.
use dnt_payment_engine::db_types::ReceiptNumber;
use log::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Could not deliver the receipt email: {0}")]
    DeliveryFailed(String),
}

#[allow(async_fn_in_trait)]
pub trait ReceiptMailer {
    async fn send_receipt(
        &self,
        recipient: &str,
        receipt_number: &ReceiptNumber,
        pdf: &[u8],
    ) -> Result<(), MailerError>;
}

/// Writes the delivery to the log and drops the attachment.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl ReceiptMailer for LogMailer {
    async fn send_receipt(
        &self,
        recipient: &str,
        receipt_number: &ReceiptNumber,
        pdf: &[u8],
    ) -> Result<(), MailerError> {
        info!("📧️ Receipt {receipt_number} ({} bytes) would be emailed to {recipient}", pdf.len());
        Ok(())
    }
}
