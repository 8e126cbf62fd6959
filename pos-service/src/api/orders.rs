use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use shared::{CreateOrderRequest, CreateOrderResponse, OrderHeader};

use super::AppState;
use crate::error::{PosError, PosResult};
use crate::handlers::{OrderHandler, ValidatedOrder};

pub async fn list_orders(State(state): State<AppState>) -> PosResult<Json<Vec<OrderHeader>>> {
    let handler = OrderHandler::new(state.pool, state.timezone);
    let orders = handler.list_orders().await?;
    Ok(Json(orders.into_iter().map(OrderHeader::from).collect()))
}

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> PosResult<(StatusCode, Json<CreateOrderResponse>)> {
    let Json(request) = payload.map_err(|e| PosError::validation(e.body_text()))?;
    let order = ValidatedOrder::try_from(request)?;

    let handler = OrderHandler::new(state.pool, state.timezone);
    let header = handler.submit(order).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order: header.into(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn empty_cart_is_rejected_before_the_store() {
        let router = offline_router();

        let (status, body) = send(
            &router,
            Method::POST,
            "/orders",
            None,
            Some(r#"{"total_amount":0,"tip_amount":0,"items":[],"employee_id":4}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Order must contain at least one item");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let router = offline_router();

        let (status, body) =
            send(&router, Method::POST, "/orders", None, Some("{\"items\": [")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn employee_id_may_arrive_as_text_but_must_be_numeric() {
        let router = offline_router();

        let (status, body) = send(
            &router,
            Method::POST,
            "/orders",
            None,
            Some(
                r#"{"total_amount":5.68,"tip_amount":0,
                    "items":[{"menu_id":3,"quantity":1}],"employee_id":"abc"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "A valid employee_id is required");
    }
}
