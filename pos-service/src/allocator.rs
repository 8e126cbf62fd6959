//! Hands out order ids and line-item ids from the tracker tables.
//!
//! Both allocations must run inside the caller's transaction: the tracker rows they
//! write only become visible when the order itself commits, and a rollback returns
//! the ids to the pool.

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use std::ops::RangeInclusive;

use crate::error::{classify_allocation_error, PosError, PosResult};
use crate::schema::idtracker;

/// Previous order id assumed when `orderidtracker` is empty.
pub const ORDER_ID_BASELINE: i32 = 15624;
/// Previous line-item id assumed when the `idtracker` singleton row is missing.
pub const LINE_ITEM_ID_BASELINE: i32 = 16209;

const TRACKER_ROW_ID: i32 = 1;

#[derive(QueryableByName)]
struct AllocatedOrderId {
    #[diesel(sql_type = Integer)]
    last_order_id: i32,
}

/// Takes the order-id lock for the rest of the caller's transaction.
///
/// SHARE ROW EXCLUSIVE conflicts with itself, so holders queue here until the current
/// one commits or rolls back. A Z-Report takes the same lock to close behind every
/// checkout already in flight.
pub async fn lock_order_ids(conn: &mut AsyncPgConnection) -> PosResult<()> {
    diesel::sql_query("LOCK TABLE orderidtracker IN SHARE ROW EXCLUSIVE MODE")
        .execute(conn)
        .await
        .map_err(classify_allocation_error)?;
    Ok(())
}

pub async fn allocate_order_id(conn: &mut AsyncPgConnection) -> PosResult<i32> {
    lock_order_ids(conn).await?;

    let row = diesel::sql_query(
        "INSERT INTO orderidtracker (last_order_id) \
         SELECT COALESCE(MAX(last_order_id), $1) + 1 FROM orderidtracker \
         RETURNING last_order_id",
    )
    .bind::<Integer, _>(ORDER_ID_BASELINE)
    .get_result::<AllocatedOrderId>(conn)
    .await
    .map_err(classify_allocation_error)?;

    Ok(row.last_order_id)
}

/// Reserves `count` consecutive line-item ids above the current high-water mark.
pub async fn allocate_line_item_ids(
    conn: &mut AsyncPgConnection,
    count: usize,
) -> PosResult<RangeInclusive<i32>> {
    let count = i32::try_from(count)
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| PosError::validation("At least one line item id must be requested"))?;
    let initial = LINE_ITEM_ID_BASELINE
        .checked_add(count)
        .ok_or_else(|| PosError::validation("Too many line items"))?;

    let high_water: i32 = diesel::insert_into(idtracker::table)
        .values((
            idtracker::id.eq(TRACKER_ROW_ID),
            idtracker::local_each_ordered_id.eq(initial),
        ))
        .on_conflict(idtracker::id)
        .do_update()
        .set(idtracker::local_each_ordered_id.eq(idtracker::local_each_ordered_id + count))
        .returning(idtracker::local_each_ordered_id)
        .get_result(conn)
        .await
        .map_err(classify_allocation_error)?;

    Ok(reserved_block(high_water, count))
}

fn reserved_block(high_water: i32, count: i32) -> RangeInclusive<i32> {
    (high_water - count + 1)..=high_water
}
