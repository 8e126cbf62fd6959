mod ingredients;
mod manager;
mod menu;
mod orders;
mod reports;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::ManagerTokens;
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub timezone: String,
    pub tokens: Arc<ManagerTokens>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/menu-items", get(menu::list_menu_items))
        .route("/ingredients", get(ingredients::list_ingredients))
        .route("/ingredients/add", post(ingredients::add_ingredient))
        .route("/ingredients/delete", delete(ingredients::delete_ingredient))
        .route("/ingredients/restock", post(ingredients::restock_ingredient))
        .route("/sales-by-item", get(reports::sales_by_item))
        .route("/inventory-usage", get(reports::inventory_usage))
        .route("/XReport", get(reports::x_report))
        .route("/z-report", get(reports::z_report))
        .route("/verify-manager-password", post(manager::verify_manager_password))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use chrono::Duration;
    use serde_json::Value;
    use tower::ServiceExt;

    pub const PASSWORD: &str = "boba-boss";

    pub fn offline_state() -> AppState {
        AppState {
            pool: crate::db::test_support::offline_pool(),
            timezone: "America/Chicago".to_string(),
            tokens: Arc::new(ManagerTokens::new(
                Some(PASSWORD.to_string()),
                "router-test-secret",
                Duration::minutes(15),
            )),
        }
    }

    /// Router over a pool that never connects; only paths rejected before store access succeed.
    pub fn offline_router() -> Router {
        create_router(offline_state())
    }

    pub async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn manager_token(router: &Router) -> String {
        let (status, body) = send(
            router,
            Method::POST,
            "/verify-manager-password",
            None,
            Some(&format!(r#"{{"password":"{}"}}"#, PASSWORD)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}
