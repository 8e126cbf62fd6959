use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use shared::{
    AddIngredientRequest, DeleteIngredientRequest, DeleteIngredientResponse, Ingredient,
    RestockIngredientRequest, RestockIngredientResponse,
};
use tracing::info;

use super::AppState;
use crate::auth::ManagerSession;
use crate::error::{PosError, PosResult};
use crate::handlers::inventory::{delete_target, restock_target};
use crate::handlers::InventoryHandler;
use crate::models::DbIngredient;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> PosResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| PosError::validation(e.body_text()))
}

pub async fn list_ingredients(State(state): State<AppState>) -> PosResult<Json<Vec<Ingredient>>> {
    let rows = InventoryHandler::new(state.pool).list().await?;
    Ok(Json(rows.into_iter().map(Ingredient::from).collect()))
}

pub async fn add_ingredient(
    State(state): State<AppState>,
    ManagerSession(manager): ManagerSession,
    payload: Result<Json<AddIngredientRequest>, JsonRejection>,
) -> PosResult<(StatusCode, Json<Ingredient>)> {
    let ingredient = DbIngredient::try_from(json_body(payload)?)?;

    let added = InventoryHandler::new(state.pool).add(ingredient).await?;
    info!(session = %manager.jti, "Manager added ingredient {}", added.ingredient_id);
    Ok((StatusCode::CREATED, Json(added.into())))
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    ManagerSession(manager): ManagerSession,
    payload: Result<Json<DeleteIngredientRequest>, JsonRejection>,
) -> PosResult<Json<DeleteIngredientResponse>> {
    let ingredient_id = delete_target(json_body(payload)?)?;

    let deleted = InventoryHandler::new(state.pool).delete(ingredient_id).await?;
    info!(session = %manager.jti, "Manager deleted ingredient {}", ingredient_id);
    Ok(Json(DeleteIngredientResponse {
        message: "Ingredient deleted successfully".to_string(),
        deleted: deleted.into(),
    }))
}

pub async fn restock_ingredient(
    State(state): State<AppState>,
    ManagerSession(manager): ManagerSession,
    payload: Result<Json<RestockIngredientRequest>, JsonRejection>,
) -> PosResult<Json<RestockIngredientResponse>> {
    let (ingredient_id, amount) = restock_target(json_body(payload)?)?;

    let updated = InventoryHandler::new(state.pool)
        .restock(ingredient_id, amount)
        .await?;
    info!(session = %manager.jti, "Manager restocked ingredient {}", ingredient_id);
    Ok(Json(RestockIngredientResponse {
        message: "Ingredient restocked successfully".to_string(),
        updated: updated.into(),
    }))
}
