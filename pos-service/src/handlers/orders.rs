use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Numeric, Text};
use diesel_async::{AsyncConnection, RunQueryDsl};
use num_traits::Zero;
use shared::{CartLine, CreateOrderRequest};
use tracing::info;

use crate::allocator;
use crate::db::DbPool;
use crate::error::{PosError, PosResult};
use crate::models::*;
use crate::schema::*;

/// A checkout request that passed validation and may be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub employee_id: i32,
    pub lines: Vec<CartLine>,
    pub total: BigDecimal,
    pub tip: BigDecimal,
}

impl TryFrom<CreateOrderRequest> for ValidatedOrder {
    type Error = PosError;

    fn try_from(request: CreateOrderRequest) -> PosResult<Self> {
        let employee_id = request
            .employee_id
            .as_ref()
            .and_then(|employee| employee.as_id())
            .ok_or_else(|| PosError::validation("A valid employee_id is required"))?;

        let lines = request.items.unwrap_or_default();
        if lines.is_empty() {
            return Err(PosError::validation("Order must contain at least one item"));
        }
        if let Some(line) = lines.iter().find(|line| line.quantity < 1) {
            return Err(PosError::validation(format!(
                "Quantity for menu item {} must be at least 1",
                line.menu_id
            )));
        }

        let total = request
            .total_amount
            .ok_or_else(|| PosError::validation("total_amount is required"))?;
        if total < BigDecimal::zero() {
            return Err(PosError::validation("total_amount must not be negative"));
        }

        let tip = request
            .tip_amount
            .ok_or_else(|| PosError::validation("tip_amount is required"))?;
        if tip < BigDecimal::zero() {
            return Err(PosError::validation("tip_amount must not be negative"));
        }

        Ok(Self {
            employee_id,
            lines,
            total,
            tip,
        })
    }
}

pub struct OrderHandler {
    pool: DbPool,
    timezone: String,
}

impl OrderHandler {
    pub fn new(pool: DbPool, timezone: impl Into<String>) -> Self {
        Self {
            pool,
            timezone: timezone.into(),
        }
    }

    pub async fn list_orders(&self) -> PosResult<Vec<Order>> {
        let mut conn = self.pool.get().await?;

        let rows = orders::table
            .select(Order::as_select())
            .order(orders::order_date.desc())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    /// Persists the header and every line in one transaction, allocating ids from the trackers.
    pub async fn submit(&self, order: ValidatedOrder) -> PosResult<Order> {
        let mut conn = self.pool.get().await?;
        let timezone = self.timezone.clone();
        let line_count = order.lines.len();

        let header = conn
            .transaction::<_, PosError, _>(|conn| {
                Box::pin(async move {
                    let order_id = allocator::allocate_order_id(conn).await?;

                    // Stamped after the order-id lock is taken, never before a close
                    // this checkout queued behind.
                    let header = diesel::sql_query(
                        "INSERT INTO orders (order_id, employee_id, order_date, total, tips) \
                         VALUES ($1, $2, clock_timestamp() AT TIME ZONE $3, $4, $5) \
                         RETURNING order_id, employee_id, order_date, total, tips",
                    )
                    .bind::<Integer, _>(order_id)
                    .bind::<Integer, _>(order.employee_id)
                    .bind::<Text, _>(&timezone)
                    .bind::<Numeric, _>(&order.total)
                    .bind::<Numeric, _>(&order.tip)
                    .get_result::<Order>(conn)
                    .await?;

                    let item_ids =
                        allocator::allocate_line_item_ids(conn, order.lines.len()).await?;
                    let line_items: Vec<LineItem> = item_ids
                        .zip(order.lines.iter())
                        .map(|(item_id, line)| LineItem {
                            item_id,
                            order_id,
                            menu_id: line.menu_id,
                            quantity: line.quantity,
                        })
                        .collect();

                    diesel::insert_into(eachordereditem::table)
                        .values(&line_items)
                        .execute(conn)
                        .await?;

                    Ok(header)
                })
            })
            .await
            .map_err(PosError::into_order_failure)?;

        info!(
            "Order {} recorded for employee {} with {} line(s)",
            header.order_id,
            header.employee_id,
            line_count
        );
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;
    use shared::pricing::{CartTotals, PricedLine};
    use shared::EmployeeRef;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn request(items: Vec<CartLine>) -> CreateOrderRequest {
        CreateOrderRequest {
            total_amount: Some(dec("12.87")),
            tip_amount: Some(dec("1.50")),
            items: Some(items),
            employee_id: Some(EmployeeRef::Id(4)),
        }
    }

    fn line(menu_id: i32, quantity: i32) -> CartLine {
        CartLine { menu_id, quantity }
    }

    #[test]
    fn accepts_a_complete_checkout() {
        let order = ValidatedOrder::try_from(request(vec![line(3, 2)])).unwrap();

        assert_eq!(order.employee_id, 4);
        assert_eq!(order.lines, vec![line(3, 2)]);
        assert_eq!(order.tip, dec("1.50"));
    }

    #[test]
    fn rejects_an_empty_cart() {
        let err = ValidatedOrder::try_from(request(vec![])).unwrap_err();

        assert!(matches!(err, PosError::Validation(_)));
    }

    #[test]
    fn rejects_missing_employee_and_tip() {
        let mut missing_employee = request(vec![line(3, 1)]);
        missing_employee.employee_id = None;
        let mut missing_tip = request(vec![line(3, 1)]);
        missing_tip.tip_amount = None;
        let mut negative_tip = request(vec![line(3, 1)]);
        negative_tip.tip_amount = Some(dec("-0.01"));

        for bad in [missing_employee, missing_tip, negative_tip] {
            assert!(matches!(
                ValidatedOrder::try_from(bad),
                Err(PosError::Validation(_))
            ));
        }
    }

    #[test]
    fn zero_tip_is_allowed_but_zero_quantity_is_not() {
        let mut no_tip = request(vec![line(3, 1)]);
        no_tip.tip_amount = Some(BigDecimal::zero());
        assert!(ValidatedOrder::try_from(no_tip).is_ok());

        let err = ValidatedOrder::try_from(request(vec![line(3, 1), line(5, 0)])).unwrap_err();
        assert!(err.to_string().contains("menu item 5"));
    }

    async fn seed_menu_item(conn: &mut diesel_async::AsyncPgConnection, menu_id: i32, price: &str) {
        diesel::sql_query(
            "INSERT INTO menuitems (menu_id, item_name, price) VALUES ($1, $2, $3) \
             ON CONFLICT (menu_id) DO UPDATE SET price = EXCLUDED.price",
        )
        .bind::<Integer, _>(menu_id)
        .bind::<Text, _>(format!("Test Item {}", menu_id))
        .bind::<Numeric, _>(dec(price))
        .execute(conn)
        .await
        .unwrap();
    }

    async fn line_item_high_water(conn: &mut diesel_async::AsyncPgConnection) -> i32 {
        idtracker::table
            .select(idtracker::local_each_ordered_id)
            .first::<i32>(conn)
            .await
            .optional()
            .unwrap()
            .unwrap_or(allocator::LINE_ITEM_ID_BASELINE)
    }

    async fn row_counts(conn: &mut diesel_async::AsyncPgConnection) -> (i64, i64, i64) {
        let orders: i64 = orders::table.count().get_result(conn).await.unwrap();
        let lines: i64 = eachordereditem::table.count().get_result(conn).await.unwrap();
        let trackers: i64 = orderidtracker::table.count().get_result(conn).await.unwrap();
        (orders, lines, trackers)
    }

    #[tokio::test]
    async fn checkout_records_header_and_lines_above_high_water_mark() {
        let Some(pool) = test_support::test_pool().await else {
            return;
        };
        let _guard = test_support::exclusive().await;
        let mut conn = pool.get().await.unwrap();
        seed_menu_item(&mut conn, 3, "5.25").await;
        let previous_high = line_item_high_water(&mut conn).await;

        let totals = CartTotals::compute(
            &[PricedLine {
                menu_id: 3,
                unit_price: dec("5.25"),
                quantity: 2,
            }],
            &dec("1.50"),
        );
        let mut checkout = request(vec![line(3, 2)]);
        checkout.total_amount = Some(totals.total.clone());

        let handler = OrderHandler::new(pool.clone(), "America/Chicago");
        let header = handler
            .submit(ValidatedOrder::try_from(checkout).unwrap())
            .await
            .unwrap();

        assert_eq!(header.total, dec("12.87"));
        assert_eq!(header.tips, dec("1.50"));

        let lines = eachordereditem::table
            .filter(eachordereditem::order_id.eq(header.order_id))
            .select(LineItem::as_select())
            .load(&mut conn)
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert!(lines[0].item_id > previous_high);

        let listed = handler.list_orders().await.unwrap();
        assert!(listed.iter().any(|order| order.order_id == header.order_id));
    }

    #[tokio::test]
    async fn failure_at_line_insert_rolls_back_everything() {
        let Some(pool) = test_support::test_pool().await else {
            return;
        };
        let _guard = test_support::exclusive().await;
        let mut conn = pool.get().await.unwrap();
        seed_menu_item(&mut conn, 3, "5.25").await;
        diesel::delete(menuitems::table.find(987_654))
            .execute(&mut conn)
            .await
            .unwrap();

        let counts_before = row_counts(&mut conn).await;
        let high_before = line_item_high_water(&mut conn).await;

        let handler = OrderHandler::new(pool.clone(), "America/Chicago");
        let err = handler
            .submit(ValidatedOrder::try_from(request(vec![line(3, 1), line(987_654, 1)])).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, PosError::OrderPersistence(_)));
        assert_eq!(row_counts(&mut conn).await, counts_before);
        assert_eq!(line_item_high_water(&mut conn).await, high_before);
    }

    #[tokio::test]
    async fn concurrent_checkouts_receive_distinct_ids() {
        let Some(pool) = test_support::test_pool().await else {
            return;
        };
        let _guard = test_support::exclusive().await;
        {
            let mut conn = pool.get().await.unwrap();
            seed_menu_item(&mut conn, 3, "5.25").await;
            seed_menu_item(&mut conn, 5, "4.75").await;
        }

        const CHECKOUTS: usize = 16;
        let tasks = (0..CHECKOUTS).map(|_| {
            let handler = OrderHandler::new(pool.clone(), "America/Chicago");
            let order = ValidatedOrder::try_from(request(vec![line(3, 1), line(5, 2)])).unwrap();
            tokio::spawn(async move { handler.submit(order).await })
        });
        let headers: Vec<Order> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        let order_ids: HashSet<i32> = headers.iter().map(|h| h.order_id).collect();
        assert_eq!(order_ids.len(), CHECKOUTS);

        let mut conn = pool.get().await.unwrap();
        let ids: Vec<i32> = order_ids.into_iter().collect();
        let item_ids: Vec<i32> = eachordereditem::table
            .filter(eachordereditem::order_id.eq_any(&ids))
            .select(eachordereditem::item_id)
            .load(&mut conn)
            .await
            .unwrap();
        let distinct: HashSet<i32> = item_ids.iter().copied().collect();
        assert_eq!(item_ids.len(), CHECKOUTS * 2);
        assert_eq!(distinct.len(), item_ids.len());
    }
}
