use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Numeric, Varchar};
use shared::*;

#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub order_id: i32,
    pub employee_id: i32,
    pub order_date: NaiveDateTime,
    pub total: BigDecimal,
    pub tips: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::eachordereditem)]
pub struct LineItem {
    pub item_id: i32,
    pub order_id: i32,
    pub menu_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::menuitems)]
pub struct DbMenuItem {
    pub menu_id: i32,
    pub item_name: String,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct DbIngredient {
    pub ingredient_id: i32,
    pub ingredient: String,
    pub current_count: BigDecimal,
    pub critical_count: BigDecimal,
    pub restock_count: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::zreports)]
pub struct NewZReportMarker {
    pub date: NaiveDate,
    pub ran: bool,
    pub closed_at: NaiveDateTime,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct HourlyRow {
    #[diesel(sql_type = Integer)]
    pub hour: i32,
    #[diesel(sql_type = BigInt)]
    pub order_count: i64,
    #[diesel(sql_type = Numeric)]
    pub sales: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub tips: BigDecimal,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct EmployeeHourRow {
    #[diesel(sql_type = Integer)]
    pub employee_id: i32,
    #[diesel(sql_type = Varchar)]
    pub name: String,
    #[diesel(sql_type = Integer)]
    pub hour: i32,
    #[diesel(sql_type = BigInt)]
    pub order_count: i64,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct TotalsRow {
    #[diesel(sql_type = BigInt)]
    pub total_orders: i64,
    #[diesel(sql_type = Numeric)]
    pub total_sales: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub total_tips: BigDecimal,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct PopularItemRow {
    #[diesel(sql_type = Varchar)]
    pub item_name: String,
    #[diesel(sql_type = BigInt)]
    pub total_ordered: i64,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct EmployeeTotalRow {
    #[diesel(sql_type = Integer)]
    pub employee_id: i32,
    #[diesel(sql_type = Varchar)]
    pub name: String,
    #[diesel(sql_type = BigInt)]
    pub total_orders: i64,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct SalesByItemRow {
    #[diesel(sql_type = Varchar)]
    pub item_name: String,
    #[diesel(sql_type = BigInt)]
    pub quantity: i64,
    #[diesel(sql_type = Numeric)]
    pub price: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub revenue: BigDecimal,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct InventoryUsageRow {
    #[diesel(sql_type = Varchar)]
    pub ingredient: String,
    #[diesel(sql_type = BigInt)]
    pub total_usage: i64,
}

impl From<Order> for OrderHeader {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id,
            employee_id: order.employee_id,
            order_date: order.order_date,
            total: order.total,
            tips: order.tips,
        }
    }
}

impl From<DbIngredient> for Ingredient {
    fn from(row: DbIngredient) -> Self {
        Self {
            ingredient_id: row.ingredient_id,
            ingredient_name: row.ingredient,
            current_amount: row.current_count,
            critical_amount: row.critical_count,
            restock_count: row.restock_count,
        }
    }
}

impl DbMenuItem {
    pub fn with_category(self, category: Option<String>) -> MenuItem {
        MenuItem {
            menu_id: self.menu_id,
            item_name: self.item_name,
            price: self.price,
            category: category.unwrap_or_default(),
        }
    }
}
