//! Cart arithmetic used by the register to produce `total_amount`.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Sales tax applied to the cart subtotal (8.25%).
pub fn tax_rate() -> BigDecimal {
    BigDecimal::new(BigInt::from(825), 4)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    pub menu_id: i32,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub tip: BigDecimal,
    pub total: BigDecimal,
}

impl CartTotals {
    pub fn compute(lines: &[PricedLine], tip: &BigDecimal) -> Self {
        let subtotal = lines
            .iter()
            .fold(BigDecimal::zero(), |acc, line| {
                acc + &line.unit_price * BigDecimal::from(line.quantity)
            });
        let tax = (&subtotal * tax_rate()).round(2);
        let total = &subtotal + &tax + tip;

        Self {
            subtotal,
            tax,
            tip: tip.clone(),
            total,
        }
    }
}
