use axum::{extract::State, response::Json};
use shared::MenuItem;

use super::AppState;
use crate::error::PosResult;
use crate::handlers::MenuHandler;

pub async fn list_menu_items(State(state): State<AppState>) -> PosResult<Json<Vec<MenuItem>>> {
    let items = MenuHandler::new(state.pool).list_menu_items().await?;
    Ok(Json(items))
}
