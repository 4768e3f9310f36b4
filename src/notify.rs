//! # Email Notifications
//!
//! One HTML mail to the kitchen inbox per new order, and one more when a
//! lead converts to Paid. Sent through the Gmail account configured via
//! `EMAIL_USER`/`EMAIL_PASS`, from and to that same address.
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::{
    config::EmailConfig,
    error::AppError,
    orders::{OrderPayload, PaymentStatus},
};

const GMAIL_RELAY: &str = "smtp.gmail.com";

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    mailbox: Mailbox,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Result<Self, AppError> {
        let mailbox: Mailbox = config.user.parse()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(GMAIL_RELAY)?
            .credentials(Credentials::new(config.user, config.pass))
            .build();

        Ok(Self { transport, mailbox })
    }

    pub async fn send_order_notification(
        &self,
        order_id: &str,
        payload: &OrderPayload,
    ) -> Result<(), AppError> {
        let message = Message::builder()
            .from(self.mailbox.clone())
            .to(self.mailbox.clone())
            .subject(subject(order_id, payload))
            .header(ContentType::TEXT_HTML)
            .body(body_html(order_id, payload))?;

        self.transport.send(message).await?;

        Ok(())
    }
}

pub fn subject(order_id: &str, payload: &OrderPayload) -> String {
    let emoji = match payload.payment_status {
        PaymentStatus::Paid => "✅",
        PaymentStatus::AbandonedCart => "⚠️",
    };

    format!(
        "{emoji} Saladly {}: {order_id} - {}",
        payload.payment_status, payload.name
    )
}

pub fn body_html(order_id: &str, payload: &OrderPayload) -> String {
    let heading = match payload.payment_status {
        PaymentStatus::Paid => "Payment Received! 🎉",
        PaymentStatus::AbandonedCart => "New Lead - Abandoned Cart ⚠️",
    };

    let coordinates = if payload.coordinates.is_empty() {
        "N/A"
    } else {
        payload.coordinates.as_str()
    };

    let instructions = if payload.delivery_instructions.is_empty() {
        String::new()
    } else {
        format!(
            "<p><strong>Delivery Instructions:</strong> {}</p>",
            payload.delivery_instructions
        )
    };

    format!(
        "<h2>{heading}</h2>\
         <p><strong>Order ID:</strong> {order_id}</p>\
         <p><strong>Payment Status:</strong> {}</p>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Phone:</strong> {}</p>\
         <p><strong>Amount:</strong> ₹{}</p>\
         <hr/>\
         <h3>Details:</h3>\
         <p>{}</p>\
         <p><strong>Address:</strong> {}</p>\
         <p><strong>Coordinates:</strong> {coordinates}</p>\
         <p><strong>Map:</strong> <a href=\"{}\">{}</a></p>\
         {instructions}",
        payload.payment_status,
        payload.name,
        payload.phone,
        payload.amount,
        payload.details,
        payload.address,
        payload.map_link,
        payload.map_link,
    )
}
