use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use num_traits::Zero;
use shared::{AddIngredientRequest, DeleteIngredientRequest, RestockIngredientRequest};
use tracing::info;

use crate::db::DbPool;
use crate::error::{PosError, PosResult};
use crate::models::*;
use crate::schema::*;

impl TryFrom<AddIngredientRequest> for DbIngredient {
    type Error = PosError;

    fn try_from(request: AddIngredientRequest) -> PosResult<Self> {
        let (Some(ingredient_id), Some(name), Some(current), Some(critical)) = (
            request.ingredient_id,
            request.ingredient_name,
            request.current_amount,
            request.critical_amount,
        ) else {
            return Err(PosError::validation("Missing required fields"));
        };

        if ingredient_id <= 0 {
            return Err(PosError::validation("ingredient_id must be positive"));
        }
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(PosError::validation("ingredient_name must not be empty"));
        }
        if current < BigDecimal::zero() || critical < BigDecimal::zero() {
            return Err(PosError::validation("Amounts must not be negative"));
        }

        Ok(Self {
            ingredient_id,
            ingredient: name,
            current_count: current,
            critical_count: critical,
            restock_count: 0,
        })
    }
}

pub fn delete_target(request: DeleteIngredientRequest) -> PosResult<i32> {
    request
        .ingredient_id
        .ok_or_else(|| PosError::validation("Ingredient ID is required"))
}

pub fn restock_target(request: RestockIngredientRequest) -> PosResult<(i32, BigDecimal)> {
    let (Some(ingredient_id), Some(amount)) = (request.ingredient_id, request.restock_amount) else {
        return Err(PosError::validation("Missing required fields"));
    };
    if amount <= BigDecimal::zero() {
        return Err(PosError::validation("Restock amount must be positive"));
    }
    Ok((ingredient_id, amount))
}

pub struct InventoryHandler {
    pool: DbPool,
}

impl InventoryHandler {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> PosResult<Vec<DbIngredient>> {
        let mut conn = self.pool.get().await?;

        let rows = ingredients::table
            .select(DbIngredient::as_select())
            .order(ingredients::ingredient_id.asc())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn add(&self, ingredient: DbIngredient) -> PosResult<DbIngredient> {
        let mut conn = self.pool.get().await?;
        let ingredient_id = ingredient.ingredient_id;

        let inserted = diesel::insert_into(ingredients::table)
            .values(&ingredient)
            .on_conflict_do_nothing()
            .returning(DbIngredient::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;

        let inserted = inserted.ok_or(PosError::DuplicateIngredient(ingredient_id))?;
        info!("Ingredient {} added", ingredient_id);
        Ok(inserted)
    }

    pub async fn delete(&self, ingredient_id: i32) -> PosResult<DbIngredient> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(ingredients::table.find(ingredient_id))
            .returning(DbIngredient::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| PosError::NotFound("Ingredient not found".to_string()))?;

        info!("Ingredient {} deleted", ingredient_id);
        Ok(deleted)
    }

    pub async fn restock(&self, ingredient_id: i32, amount: BigDecimal) -> PosResult<DbIngredient> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(ingredients::table.find(ingredient_id))
            .set((
                ingredients::current_count.eq(ingredients::current_count + amount),
                ingredients::restock_count.eq(ingredients::restock_count + 1),
            ))
            .returning(DbIngredient::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| PosError::NotFound("Ingredient not found".to_string()))?;

        info!(
            "Ingredient {} restocked, now at {} after {} restocks",
            ingredient_id, updated.current_count, updated.restock_count
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn add_request(id: i32) -> AddIngredientRequest {
        AddIngredientRequest {
            ingredient_id: Some(id),
            ingredient_name: Some("Tapioca Pearls".to_string()),
            current_amount: Some(dec("40")),
            critical_amount: Some(dec("10")),
        }
    }

    #[test]
    fn add_request_starts_with_zero_restocks() {
        let row = DbIngredient::try_from(add_request(71)).unwrap();

        assert_eq!(row.restock_count, 0);
        assert_eq!(row.ingredient, "Tapioca Pearls");
    }

    #[test]
    fn add_request_rejects_missing_or_negative_values() {
        let mut missing = add_request(71);
        missing.critical_amount = None;
        let mut negative = add_request(71);
        negative.current_amount = Some(dec("-1"));
        let mut blank = add_request(71);
        blank.ingredient_name = Some("  ".to_string());

        for bad in [missing, negative, blank] {
            assert!(matches!(
                DbIngredient::try_from(bad),
                Err(PosError::Validation(_))
            ));
        }
    }

    #[test]
    fn restock_requires_a_positive_delta() {
        let zero = RestockIngredientRequest {
            ingredient_id: Some(1),
            restock_amount: Some(BigDecimal::zero()),
        };
        let missing = RestockIngredientRequest {
            ingredient_id: None,
            restock_amount: Some(dec("3")),
        };

        assert!(restock_target(zero).is_err());
        assert!(restock_target(missing).is_err());
        assert_eq!(
            restock_target(RestockIngredientRequest {
                ingredient_id: Some(1),
                restock_amount: Some(dec("2.5")),
            })
            .unwrap(),
            (1, dec("2.5"))
        );
    }

    #[tokio::test]
    async fn duplicate_add_is_a_conflict() {
        let Some(pool) = test_support::test_pool().await else {
            return;
        };
        let _guard = test_support::exclusive().await;
        let handler = InventoryHandler::new(pool.clone());
        let _ = handler.delete(9101).await;

        handler
            .add(DbIngredient::try_from(add_request(9101)).unwrap())
            .await
            .unwrap();
        let err = handler
            .add(DbIngredient::try_from(add_request(9101)).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, PosError::DuplicateIngredient(9101)));
        handler.delete(9101).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_missing_ingredient_leaves_the_table_alone() {
        let Some(pool) = test_support::test_pool().await else {
            return;
        };
        let _guard = test_support::exclusive().await;
        let handler = InventoryHandler::new(pool.clone());
        let _ = handler.delete(9102).await;
        let before = handler.list().await.unwrap().len();

        let err = handler.delete(9102).await.unwrap_err();

        assert!(matches!(err, PosError::NotFound(_)));
        assert_eq!(handler.list().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn concurrent_restocks_accumulate() {
        let Some(pool) = test_support::test_pool().await else {
            return;
        };
        let _guard = test_support::exclusive().await;
        let handler = InventoryHandler::new(pool.clone());
        let _ = handler.delete(9103).await;
        let _ = handler.delete(9104).await;
        handler
            .add(DbIngredient::try_from(add_request(9103)).unwrap())
            .await
            .unwrap();
        handler
            .add(DbIngredient::try_from(add_request(9104)).unwrap())
            .await
            .unwrap();

        let (first, second, unrelated) = tokio::join!(
            handler.restock(9103, dec("7.5")),
            handler.restock(9103, dec("7.5")),
            handler.delete(9104),
        );
        first.unwrap();
        second.unwrap();
        unrelated.unwrap();

        let row = handler
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|row| row.ingredient_id == 9103)
            .unwrap();
        assert_eq!(row.current_count, dec("55"));
        assert_eq!(row.restock_count, 2);
        handler.delete(9103).await.unwrap();
    }
}
