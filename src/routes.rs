use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State as AppState};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    error::AppError,
    orders::{
        DEFAULT_ORDER_ID, OrderPayload, fallback_order_id, next_order_id, parse_order,
        should_notify,
    },
    sheets::{ORDER_ID_COLUMN, SheetsClient, order_row},
    state::State,
};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub order_id: String,
}

/// Order intake. No `orderId` in the body creates a row, a present `orderId`
/// rewrites that row's payment status. The sheet write and the notification
/// mail are independent best-effort operations: either can fail without
/// affecting the other or the response, because the browser has already
/// navigated away by the time we run.
pub async fn submit_order_handler(
    AppState(state): AppState<Arc<State>>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError> {
    let payload = parse_order(&body)?;

    let is_update = payload.order_id.is_some();
    let mut order_id = payload
        .order_id
        .clone()
        .unwrap_or_else(|| DEFAULT_ORDER_ID.to_string());

    match &state.sheets {
        None => warn!("Google Sheets not configured, skipping order sheet"),
        Some(sheets) => {
            if is_update {
                update_order(sheets, &order_id, &payload).await;
            } else {
                order_id = create_order(sheets, &payload).await;
            }
        }
    }

    if should_notify(is_update, payload.payment_status) {
        match &state.mailer {
            None => warn!("Email not configured, skipping notification"),
            Some(mailer) => {
                if let Err(e) = mailer.send_order_notification(&order_id, &payload).await {
                    error!("Email error: {e}");
                }
            }
        }
    }

    Ok(Json(SubmitResponse {
        success: true,
        message: "Order processed successfully".to_string(),
        order_id,
    }))
}

async fn create_order(sheets: &SheetsClient, payload: &OrderPayload) -> String {
    let order_id = match sheets.list_rows().await {
        Ok(rows) => next_order_id(
            rows.iter()
                .filter_map(|row| row.get(ORDER_ID_COLUMN))
                .map(String::as_str),
        ),
        Err(e) => {
            error!("Google Sheets error: {e}");
            fallback_order_id(Utc::now().timestamp_millis())
        }
    };

    if let Err(e) = sheets.append_row(&order_row(&order_id, payload)).await {
        error!("Google Sheets error: {e}");
    }

    order_id
}

async fn update_order(sheets: &SheetsClient, order_id: &str, payload: &OrderPayload) {
    match sheets
        .update_payment_status(order_id, payload.payment_status)
        .await
    {
        Ok(true) => info!("Updated order {order_id} to {}", payload.payment_status),
        Ok(false) => warn!("Order {order_id} not found, nothing updated"),
        Err(e) => error!("Google Sheets error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use super::*;
    use crate::config::Config;

    fn bare_state() -> Arc<State> {
        Arc::new(State {
            config: Config {
                port: 0,
                sheets: None,
                email: None,
            },
            sheets: None,
            mailer: None,
        })
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_succeeds_without_credentials() {
        let body = Bytes::from_static(
            br#"{
                "date": "2026-08-05T10:00:00.000Z",
                "paymentStatus": "Abandoned Cart",
                "name": "Asha",
                "phone": "9876543210",
                "amount": "1194"
            }"#,
        );

        let response = submit_order_handler(AppState(bare_state()), body)
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Order processed successfully");
        assert_eq!(json["orderId"], "S-1001");
    }

    #[tokio::test]
    async fn test_update_echoes_provided_id() {
        let body = Bytes::from_static(br#"{"orderId":"S-1002","paymentStatus":"Paid"}"#);

        let response = submit_order_handler(AppState(bare_state()), body)
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["orderId"], "S-1002");
    }

    #[tokio::test]
    async fn test_malformed_body_reports_generic_failure() {
        let response = submit_order_handler(AppState(bare_state()), Bytes::from_static(b"not json"))
            .await
            .unwrap_err()
            .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = response_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Internal Server Error");
        assert!(json.get("orderId").is_none());
    }
}
