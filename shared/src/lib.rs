use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub mod pricing;
pub mod reports;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Employee identifier as sent by the register: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeeRef {
    Id(i64),
    Text(String),
}

impl EmployeeRef {
    pub fn as_id(&self) -> Option<i32> {
        match self {
            EmployeeRef::Id(id) => i32::try_from(*id).ok(),
            EmployeeRef::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub total_amount: Option<BigDecimal>,
    pub tip_amount: Option<BigDecimal>,
    pub items: Option<Vec<CartLine>>,
    pub employee_id: Option<EmployeeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub order_id: i32,
    pub employee_id: i32,
    pub order_date: NaiveDateTime,
    pub total: BigDecimal,
    pub tips: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order: OrderHeader,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub menu_id: i32,
    pub item_name: String,
    pub price: BigDecimal,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub ingredient_id: i32,
    pub ingredient_name: String,
    pub current_amount: BigDecimal,
    pub critical_amount: BigDecimal,
    pub restock_count: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddIngredientRequest {
    pub ingredient_id: Option<i32>,
    pub ingredient_name: Option<String>,
    pub current_amount: Option<BigDecimal>,
    pub critical_amount: Option<BigDecimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteIngredientRequest {
    pub ingredient_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteIngredientResponse {
    pub message: String,
    pub deleted: Ingredient,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestockIngredientRequest {
    pub ingredient_id: Option<i32>,
    pub restock_amount: Option<BigDecimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestockIngredientResponse {
    pub message: String,
    pub updated: Ingredient,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyPasswordRequest {
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl VerifyPasswordResponse {
    pub fn granted(token: String, expires_at: i64) -> Self {
        Self {
            success: true,
            token: Some(token),
            expires_at: Some(expires_at),
        }
    }

    pub fn denied() -> Self {
        Self {
            success: false,
            token: None,
            expires_at: None,
        }
    }
}
