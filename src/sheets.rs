//! # Google Sheets
//!
//! Spreadsheet acting as the order book. One worksheet, one row per order.
//!
//! ## Schema
//! - Row 1 is the header row
//! - Columns A..L: Order ID, Payment Status, Date, Name, Phone, Address,
//!   Coordinates, Map Link, Details, Amount, Start Date, Delivery Instructions
//! - Order ID (**string**, `S-<n>`) is written once and never rewritten
//! - Payment Status (**string**) is the only cell touched after creation
//!
//! ## Auth
//! - Service account JWT (RS256) exchanged for a bearer token on every call
//! - No token cache, order traffic is far too low for the extra round trip
//!   to matter
//!
//! ## Commands
//!
//! Inspect the sheet values directly.
//! ```sh
//! curl -H "Authorization: Bearer $TOKEN" \
//!     "https://sheets.googleapis.com/v4/spreadsheets/$GOOGLE_SHEET_ID/values/Sheet1"
//! ```
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::SheetsConfig,
    error::AppError,
    orders::{OrderPayload, PaymentStatus},
};

pub const SHEET_RANGE: &str = "Sheet1";
pub const ORDER_ID_COLUMN: usize = 0;
pub const PAYMENT_STATUS_COLUMN: &str = "B";

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

pub struct SheetsClient {
    http: Client,
    config: SheetsConfig,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.config.service_account_email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_ENDPOINT,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(self.config.private_key.as_bytes())?,
        )?;

        let response: TokenResponse = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.access_token)
    }

    /// All data rows, header stripped, in sheet order.
    pub async fn list_rows(&self) -> Result<Vec<Vec<String>>, AppError> {
        let token = self.access_token().await?;

        let range: ValueRange = self
            .http
            .get(format!(
                "{SHEETS_ENDPOINT}/{}/values/{SHEET_RANGE}",
                self.config.sheet_id
            ))
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut rows = range.values;
        if !rows.is_empty() {
            rows.remove(0);
        }

        Ok(rows)
    }

    pub async fn append_row(&self, row: &[String]) -> Result<(), AppError> {
        let token = self.access_token().await?;

        self.http
            .post(format!(
                "{SHEETS_ENDPOINT}/{}/values/{SHEET_RANGE}:append",
                self.config.sheet_id
            ))
            .bearer_auth(&token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [row] }))
            .send()
            .await?
            .error_for_status()?;

        #[cfg(feature = "verbose")]
        tracing::info!("Appended row: {row:?}");

        Ok(())
    }

    /// Rewrites the Payment Status cell of the row whose Order ID matches
    /// exactly. Returns false when no row matches, which is not an error.
    pub async fn update_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> Result<bool, AppError> {
        let rows = self.list_rows().await?;

        let Some(index) = find_order_row(&rows, order_id) else {
            return Ok(false);
        };

        let token = self.access_token().await?;

        // values are 1-indexed and the header occupies row 1
        let cell = format!("{SHEET_RANGE}!{PAYMENT_STATUS_COLUMN}{}", index + 2);

        self.http
            .put(format!(
                "{SHEETS_ENDPOINT}/{}/values/{cell}",
                self.config.sheet_id
            ))
            .bearer_auth(&token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": [[status.to_string()]] }))
            .send()
            .await?
            .error_for_status()?;

        Ok(true)
    }
}

pub fn find_order_row(rows: &[Vec<String>], order_id: &str) -> Option<usize> {
    rows.iter()
        .position(|row| row.get(ORDER_ID_COLUMN).is_some_and(|id| id == order_id))
}

/// Payload laid out on the A..L column order of the sheet.
pub fn order_row(order_id: &str, payload: &OrderPayload) -> Vec<String> {
    vec![
        order_id.to_string(),
        payload.payment_status.to_string(),
        payload.date.clone(),
        payload.name.clone(),
        payload.phone.clone(),
        payload.address.clone(),
        payload.coordinates.clone(),
        payload.map_link.clone(),
        payload.details.clone(),
        payload.amount.clone(),
        payload.start_date.clone(),
        payload.delivery_instructions.clone(),
    ]
}
