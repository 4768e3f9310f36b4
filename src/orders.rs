//! # Orders
//!
//! Order domain model and id allocation.
//!
//! ## Lifecycle
//! - Created as **Abandoned Cart** before the customer reaches the payment
//!   gateway (the subscribe/trial pages submit fire-and-forget)
//! - Flipped to **Paid** by a follow-up call once the gateway confirms
//! - Never deleted, the sheet keeps every lead
//!
//! ## Id Allocation
//! - Ids look like `S-1001`, `S-1002`, assigned at creation and never changed
//! - Next id is the highest numeric suffix in the sheet plus one, so gaps and
//!   out-of-order rows are fine
//! - If the sheet cannot be read at all, a timestamp-derived `S-<6 digits>`
//!   id is used instead so the order is never dropped
use std::fmt;

use axum::body::Bytes;
use regex::Regex;
use serde::Deserialize;

use crate::error::AppError;

/// First id handed out on an empty sheet. Also the id reported back when the
/// caller supplied none and the sheet was not configured, so allocation never
/// ran.
pub const DEFAULT_ORDER_ID: &str = "S-1001";

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum PaymentStatus {
    Paid,
    #[default]
    #[serde(rename = "Abandoned Cart")]
    AbandonedCart,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::AbandonedCart => write!(f, "Abandoned Cart"),
        }
    }
}

/// Inbound body of `POST /api/submit-order`. A present `orderId` selects
/// update mode, everything else is order content forwarded by the frontend.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub order_id: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coordinates: String,
    #[serde(default)]
    pub map_link: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub delivery_instructions: String,
}

pub fn parse_order(body: &Bytes) -> Result<OrderPayload, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::MalformedPayload)
}

/// Highest numeric suffix across the existing ids, plus one. The sheet has no
/// atomic counter, so this is a full scan with a read-then-append window: two
/// simultaneous creates can read the same maximum and collide on one id.
/// Accepted at current order volume.
pub fn next_order_id<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let suffix = Regex::new(r"S-(\d+)").unwrap();

    let mut max_num: u64 = 0;
    let mut seen = false;

    for id in ids {
        seen = true;

        if let Some(captures) = suffix.captures(id) {
            if let Ok(num) = captures[1].parse::<u64>() {
                if num > max_num {
                    max_num = num;
                }
            }
        }
    }

    if !seen {
        return DEFAULT_ORDER_ID.to_string();
    }

    format!("S-{}", max_num + 1)
}

/// Last 6 digits of the Unix millisecond timestamp, zero-padded. Only used
/// when the sheet read fails during creation.
pub fn fallback_order_id(unix_ms: i64) -> String {
    format!("S-{:06}", unix_ms % 1_000_000)
}

/// Every new order is announced. Updates only matter once the lead converts.
pub fn should_notify(is_update: bool, status: PaymentStatus) -> bool {
    !is_update || status == PaymentStatus::Paid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sheet() {
        assert_eq!(next_order_id(Vec::<&str>::new()), "S-1001");
    }

    #[test]
    fn test_sequential() {
        assert_eq!(next_order_id(["S-1001"]), "S-1002");
        assert_eq!(next_order_id(["S-1001", "S-1002"]), "S-1003");
        assert_eq!(
            next_order_id(["S-1001", "S-1002", "S-1003", "S-1004", "S-1005"]),
            "S-1006"
        );
    }

    #[test]
    fn test_gap_tolerant() {
        assert_eq!(next_order_id(["S-1001", "S-1003", "S-1010"]), "S-1011");
    }

    #[test]
    fn test_out_of_order() {
        assert_eq!(next_order_id(["S-1005", "S-1001", "S-1003"]), "S-1006");
    }

    #[test]
    fn test_skips_malformed_ids() {
        assert_eq!(next_order_id(["garbage", "S-", "S-1004"]), "S-1005");
        assert_eq!(next_order_id(["garbage", ""]), "S-1");
    }

    #[test]
    fn test_fallback_keeps_last_six_digits() {
        assert_eq!(fallback_order_id(1_700_000_123_456), "S-123456");
        assert_eq!(fallback_order_id(1_700_000_000_042), "S-000042");
    }

    #[test]
    fn test_notify_rules() {
        assert!(should_notify(false, PaymentStatus::AbandonedCart));
        assert!(should_notify(false, PaymentStatus::Paid));
        assert!(should_notify(true, PaymentStatus::Paid));
        assert!(!should_notify(true, PaymentStatus::AbandonedCart));
    }

    #[test]
    fn test_parse_defaults() {
        let payload = parse_order(&Bytes::from_static(b"{}")).unwrap();

        assert!(payload.order_id.is_none());
        assert_eq!(payload.payment_status, PaymentStatus::AbandonedCart);
        assert_eq!(payload.name, "");
        assert_eq!(payload.delivery_instructions, "");
    }

    #[test]
    fn test_parse_full_payload() {
        let payload = parse_order(&Bytes::from_static(
            br#"{
                "orderId": "S-1002",
                "date": "2026-08-05T10:00:00.000Z",
                "paymentStatus": "Paid",
                "name": "Asha",
                "phone": "9876543210",
                "mapLink": "https://www.google.com/maps/place/12.97,77.59",
                "startDate": "2026-08-07",
                "deliveryInstructions": "Ring twice"
            }"#,
        ))
        .unwrap();

        assert_eq!(payload.order_id.as_deref(), Some("S-1002"));
        assert_eq!(payload.payment_status, PaymentStatus::Paid);
        assert_eq!(payload.map_link, "https://www.google.com/maps/place/12.97,77.59");
        assert_eq!(payload.start_date, "2026-08-07");
        assert_eq!(payload.delivery_instructions, "Ring twice");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_order(&Bytes::from_static(b"not json")).is_err());
        assert!(parse_order(&Bytes::from_static(br#"{"paymentStatus":"Refunded"}"#)).is_err());
    }
}
