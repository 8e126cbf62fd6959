use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use shared::MenuItem;

use crate::db::DbPool;
use crate::error::PosResult;
use crate::models::DbMenuItem;
use crate::schema::*;

pub struct MenuHandler {
    pool: DbPool,
}

impl MenuHandler {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Menu items with the category assigned to their id in `menucategories`.
    pub async fn list_menu_items(&self) -> PosResult<Vec<MenuItem>> {
        let mut conn = self.pool.get().await?;

        let rows = menuitems::table
            .left_join(menucategories::table)
            .select((DbMenuItem::as_select(), menucategories::category.nullable()))
            .order(menuitems::menu_id.asc())
            .load::<(DbMenuItem, Option<String>)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(item, category)| item.with_category(category))
            .collect())
    }
}
