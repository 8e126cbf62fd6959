//! Day-level aggregates over `orders` and `eachordereditem`.
//!
//! `order_date` holds business-local wall-clock time, so calendar days and hours are
//! computed directly in SQL. Every aggregate runs over a [`ReportWindow`]: the X-Report
//! starts after the day's latest close marker, the Z-Report covers the span between the
//! previous marker and its own.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::pg::Pg;
use diesel::query_builder::{Query, QueryFragment, QueryId, SqlQuery};
use diesel::sql_types::{Date, Nullable, Timestamp, Untyped};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use num_traits::{ToPrimitive, Zero};
use shared::reports::*;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::allocator;
use crate::clock;
use crate::db::DbPool;
use crate::error::{PosError, PosResult};
use crate::models::*;
use crate::schema::zreports;

/// Hours pre-filled with zero on every employee's hourly breakdown.
pub const BUSINESS_HOURS: std::ops::RangeInclusive<i32> = 10..=22;

const WINDOW: &str = "o.order_date::date = $1 \
     AND ($2::timestamp IS NULL OR o.order_date > $2) \
     AND ($3::timestamp IS NULL OR o.order_date <= $3)";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportWindow {
    pub day: NaiveDate,
    pub after: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

impl ReportWindow {
    pub fn whole_day(day: NaiveDate) -> Self {
        Self {
            day,
            after: None,
            until: None,
        }
    }
}

/// Where a Z-Report takes its close time from.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseAt {
    /// Store clock in the given business timezone, read once in-flight checkouts are done.
    BusinessNow(String),
    Fixed(NaiveDateTime),
}

fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

pub struct ReportHandler {
    pool: DbPool,
    timezone: String,
}

impl ReportHandler {
    pub fn new(pool: DbPool, timezone: impl Into<String>) -> Self {
        Self {
            pool,
            timezone: timezone.into(),
        }
    }

    pub async fn x_report(&self) -> PosResult<XReport> {
        let mut conn = self.pool.get().await?;
        let now = clock::business_now(&mut conn, &self.timezone).await?;
        x_report_at(&mut conn, now).await
    }

    pub async fn z_report(&self) -> PosResult<ZReport> {
        let mut conn = self.pool.get().await?;
        z_report_at(&mut conn, CloseAt::BusinessNow(self.timezone.clone())).await
    }

    pub async fn sales_by_item(&self, day: NaiveDate) -> PosResult<Vec<SalesByItem>> {
        let mut conn = self.pool.get().await?;
        let window = ReportWindow::whole_day(day);

        let rows = bind_window(
            diesel::sql_query(format!(
                "SELECT mi.item_name, SUM(eoi.quantity)::bigint AS quantity, mi.price, \
                        SUM(eoi.quantity * mi.price) AS revenue \
                 FROM orders o \
                 JOIN eachordereditem eoi ON o.order_id = eoi.order_id \
                 JOIN menuitems mi ON eoi.menu_id = mi.menu_id \
                 WHERE {WINDOW} \
                 GROUP BY mi.item_name, mi.price \
                 ORDER BY quantity DESC, mi.item_name"
            )),
            &window,
        )
        .load::<SalesByItemRow>(&mut conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SalesByItem {
                item_name: row.item_name,
                quantity: row.quantity,
                price: to_f64(&row.price),
                revenue: to_f64(&row.revenue),
            })
            .collect())
    }

    pub async fn inventory_usage(&self, day: NaiveDate) -> PosResult<Vec<InventoryUsage>> {
        let mut conn = self.pool.get().await?;
        let window = ReportWindow::whole_day(day);

        let rows = bind_window(
            diesel::sql_query(format!(
                "SELECT i.ingredient, SUM(eoi.quantity)::bigint AS total_usage \
                 FROM orders o \
                 JOIN eachordereditem eoi ON o.order_id = eoi.order_id \
                 JOIN menutoingredient mti ON eoi.menu_id = mti.menu_id \
                 JOIN ingredients i ON mti.ingredient_id = i.ingredient_id \
                 WHERE {WINDOW} \
                 GROUP BY i.ingredient \
                 ORDER BY i.ingredient"
            )),
            &window,
        )
        .load::<InventoryUsageRow>(&mut conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| InventoryUsage {
                ingredient: row.ingredient,
                usage: row.total_usage,
            })
            .collect())
    }
}

/// Binds `$1..$3` of [`WINDOW`].
fn bind_window(query: SqlQuery, window: &ReportWindow) -> impl Query<SqlType = Untyped> + QueryFragment<Pg> + QueryId + Send + 'static {
    query
        .bind::<Date, _>(window.day)
        .bind::<Nullable<Timestamp>, _>(window.after)
        .bind::<Nullable<Timestamp>, _>(window.until)
}

async fn latest_close(
    conn: &mut AsyncPgConnection,
    day: NaiveDate,
) -> PosResult<Option<NaiveDateTime>> {
    let closed_at = zreports::table
        .filter(zreports::date.eq(day))
        .select(diesel::dsl::max(zreports::closed_at))
        .first::<Option<NaiveDateTime>>(conn)
        .await?;
    Ok(closed_at)
}

async fn hourly_rows(
    conn: &mut AsyncPgConnection,
    window: &ReportWindow,
) -> PosResult<Vec<HourlyRow>> {
    let rows = bind_window(
        diesel::sql_query(format!(
            "SELECT EXTRACT(HOUR FROM o.order_date)::int AS hour, \
                    COUNT(o.order_id) AS order_count, \
                    COALESCE(SUM(o.total), 0) AS sales, \
                    COALESCE(SUM(o.tips), 0) AS tips \
             FROM orders o \
             WHERE {WINDOW} \
             GROUP BY hour \
             ORDER BY hour"
        )),
        window,
    )
    .load(conn)
    .await?;
    Ok(rows)
}

async fn employee_hour_rows(
    conn: &mut AsyncPgConnection,
    window: &ReportWindow,
) -> PosResult<Vec<EmployeeHourRow>> {
    let rows = bind_window(
        diesel::sql_query(format!(
            "SELECT e.employee_id, e.name, EXTRACT(HOUR FROM o.order_date)::int AS hour, \
                    COUNT(o.order_id) AS order_count \
             FROM orders o \
             JOIN employees e ON o.employee_id = e.employee_id \
             WHERE {WINDOW} \
             GROUP BY e.employee_id, e.name, hour \
             ORDER BY e.name, e.employee_id, hour"
        )),
        window,
    )
    .load(conn)
    .await?;
    Ok(rows)
}

async fn window_totals(
    conn: &mut AsyncPgConnection,
    window: &ReportWindow,
) -> PosResult<TotalsRow> {
    let totals = bind_window(
        diesel::sql_query(format!(
            "SELECT COUNT(o.order_id) AS total_orders, \
                    COALESCE(SUM(o.total), 0) AS total_sales, \
                    COALESCE(SUM(o.tips), 0) AS total_tips \
             FROM orders o \
             WHERE {WINDOW}"
        )),
        window,
    )
    .get_result(conn)
    .await?;
    Ok(totals)
}

pub async fn x_report_at(conn: &mut AsyncPgConnection, now: NaiveDateTime) -> PosResult<XReport> {
    let day = now.date();
    let last_close = latest_close(conn, day).await?;
    let window = ReportWindow {
        day,
        after: last_close,
        until: None,
    };

    let hourly = hourly_rows(conn, &window).await?;
    let employees = employee_hour_rows(conn, &window).await?;

    Ok(build_x_report(day, last_close.is_some(), &hourly, &employees))
}

/// Writes a close marker and snapshots everything since the previous one.
///
/// Holds the order-id lock for the whole transaction: checkouts already allocating
/// commit before the close time is read, and later ones are stamped after it.
/// Concurrent closes queue on the same lock, so their windows never overlap.
pub async fn z_report_at(conn: &mut AsyncPgConnection, close_at: CloseAt) -> PosResult<ZReport> {
    let report = conn
        .transaction::<_, PosError, _>(|conn| {
            Box::pin(async move {
                allocator::lock_order_ids(conn).await?;
                let now = match close_at {
                    CloseAt::BusinessNow(timezone) => clock::business_now(conn, &timezone).await?,
                    CloseAt::Fixed(at) => at,
                };
                let day = now.date();
                let previous_close = latest_close(conn, day).await?;

                diesel::insert_into(zreports::table)
                    .values(&NewZReportMarker {
                        date: day,
                        ran: true,
                        closed_at: now,
                    })
                    .execute(conn)
                    .await?;

                let window = ReportWindow {
                    day,
                    after: previous_close,
                    until: Some(now),
                };

                let totals = window_totals(conn, &window).await?;

                let popular = bind_window(
                    diesel::sql_query(format!(
                        "SELECT mi.item_name, SUM(eoi.quantity)::bigint AS total_ordered \
                         FROM orders o \
                         JOIN eachordereditem eoi ON o.order_id = eoi.order_id \
                         JOIN menuitems mi ON eoi.menu_id = mi.menu_id \
                         WHERE {WINDOW} \
                         GROUP BY mi.item_name \
                         ORDER BY total_ordered DESC, mi.item_name \
                         LIMIT 1"
                    )),
                    &window,
                )
                .get_result::<PopularItemRow>(conn)
                .await
                .optional()?;

                let employees = bind_window(
                    diesel::sql_query(format!(
                        "SELECT e.employee_id, e.name, COUNT(o.order_id) AS total_orders \
                         FROM employees e \
                         LEFT JOIN orders o ON e.employee_id = o.employee_id AND {WINDOW} \
                         GROUP BY e.employee_id, e.name \
                         ORDER BY total_orders DESC, e.employee_id"
                    )),
                    &window,
                )
                .load::<EmployeeTotalRow>(conn)
                .await?;

                Ok(build_z_report(day, now, totals, popular, employees))
            })
        })
        .await?;

    info!(
        "Z-Report closed {} at {} with {} orders",
        report.date, report.closed_at, report.total_orders
    );
    Ok(report)
}

pub fn build_x_report(
    date: NaiveDate,
    z_report_run: bool,
    hourly: &[HourlyRow],
    employees: &[EmployeeHourRow],
) -> XReport {
    let series = |value: fn(&HourlyRow) -> f64| -> Vec<HourlyValue> {
        hourly
            .iter()
            .map(|row| HourlyValue {
                hour: hour_label(row.hour),
                value: value(row),
            })
            .collect()
    };

    let total_sales = hourly
        .iter()
        .fold(BigDecimal::zero(), |acc, row| acc + &row.sales);
    let total_tips = hourly
        .iter()
        .fold(BigDecimal::zero(), |acc, row| acc + &row.tips);

    XReport {
        date,
        z_report_run,
        orders_by_hour: series(|row| row.order_count as f64),
        sales_by_hour: series(|row| to_f64(&row.sales)),
        tips_data: series(|row| to_f64(&row.tips)),
        employee_orders: fold_employee_hours(employees),
        summary: ReportSummary {
            total_orders: hourly.iter().map(|row| row.order_count).sum(),
            total_sales: to_f64(&total_sales),
            total_tips: to_f64(&total_tips),
        },
    }
}

/// Groups per-hour counts by employee, keeping the order employees first appear in.
pub fn fold_employee_hours(rows: &[EmployeeHourRow]) -> Vec<EmployeeHourlyOrders> {
    let mut positions: HashMap<i32, usize> = HashMap::new();
    let mut grouped: Vec<EmployeeHourlyOrders> = Vec::new();

    for row in rows {
        let index = *positions.entry(row.employee_id).or_insert_with(|| {
            let hourly_orders: BTreeMap<HourSlot, i64> =
                BUSINESS_HOURS.map(|hour| (HourSlot(hour), 0)).collect();
            grouped.push(EmployeeHourlyOrders {
                employee: format!("{} - {}", row.employee_id, row.name),
                hourly_orders,
                total: 0,
            });
            grouped.len() - 1
        });

        let entry = &mut grouped[index];
        entry.hourly_orders.insert(HourSlot(row.hour), row.order_count);
        entry.total += row.order_count;
    }

    grouped
}

pub fn build_z_report(
    date: NaiveDate,
    closed_at: NaiveDateTime,
    totals: TotalsRow,
    popular: Option<PopularItemRow>,
    employees: Vec<EmployeeTotalRow>,
) -> ZReport {
    let most_popular_item = match popular {
        Some(row) => PopularItem {
            name: row.item_name,
            count: row.total_ordered,
        },
        None => PopularItem {
            name: "None".to_string(),
            count: 0,
        },
    };

    ZReport {
        date,
        closed_at,
        total_orders: totals.total_orders,
        total_sales: to_f64(&totals.total_sales),
        total_tips: to_f64(&totals.total_tips),
        most_popular_item,
        employee_order_totals: employees
            .into_iter()
            .map(|row| EmployeeOrderTotal {
                employee_id: row.employee_id,
                name: row.name,
                total_orders: row.total_orders,
            })
            .collect(),
    }
}
