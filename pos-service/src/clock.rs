use chrono::NaiveDateTime;
use diesel::sql_types::{Text, Timestamp};
use diesel::QueryableByName;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::PosResult;

#[derive(QueryableByName)]
struct BusinessNow {
    #[diesel(sql_type = Timestamp)]
    now: NaiveDateTime,
}

/// Current wall-clock time in the business timezone, read from the store's clock.
///
/// Uses `clock_timestamp()`, so inside a transaction it reflects the moment of the call.
pub async fn business_now(
    conn: &mut AsyncPgConnection,
    timezone: &str,
) -> PosResult<NaiveDateTime> {
    let row = diesel::sql_query("SELECT (clock_timestamp() AT TIME ZONE $1) AS now")
        .bind::<Text, _>(timezone)
        .get_result::<BusinessNow>(conn)
        .await?;
    Ok(row.now)
}
