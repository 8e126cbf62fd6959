use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyValue {
    pub hour: String,
    pub value: f64,
}

/// Hour of the business day as a map key: ordered numerically, written as `"H:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct HourSlot(pub i32);

impl From<HourSlot> for String {
    fn from(slot: HourSlot) -> Self {
        hour_label(slot.0)
    }
}

impl TryFrom<String> for HourSlot {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label
            .strip_suffix(":00")
            .and_then(|hour| hour.parse().ok())
            .map(HourSlot)
            .ok_or_else(|| format!("invalid hour label: {}", label))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHourlyOrders {
    pub employee: String,
    pub hourly_orders: BTreeMap<HourSlot, i64>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_orders: i64,
    pub total_sales: f64,
    pub total_tips: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XReport {
    pub date: NaiveDate,
    pub z_report_run: bool,
    pub orders_by_hour: Vec<HourlyValue>,
    pub sales_by_hour: Vec<HourlyValue>,
    pub employee_orders: Vec<EmployeeHourlyOrders>,
    pub tips_data: Vec<HourlyValue>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularItem {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeOrderTotal {
    pub employee_id: i32,
    pub name: String,
    pub total_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZReport {
    pub date: NaiveDate,
    pub closed_at: NaiveDateTime,
    pub total_orders: i64,
    pub total_sales: f64,
    pub total_tips: f64,
    pub most_popular_item: PopularItem,
    pub employee_order_totals: Vec<EmployeeOrderTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesByItem {
    pub item_name: String,
    pub quantity: i64,
    pub price: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryUsage {
    pub ingredient: String,
    pub usage: i64,
}

/// Hour label used on every hourly series, e.g. `"9:00"`, `"14:00"`.
pub fn hour_label(hour: i32) -> String {
    format!("{}:00", hour)
}
