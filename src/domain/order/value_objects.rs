use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::valuation::exact_product;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Opaque reference to a customer owned by another system
pub type CustomerId = i64;

/// Opaque reference to a product owned by another system
pub type ProductId = i64;

/// Line item as requested by the caller, before validation
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct LineItemInput {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_description: String,
    pub quantity: i32,
    #[serde(deserialize_with = "exact_decimal")]
    pub unit_price: Decimal,
}

/// Validated line item, owned by exactly one order
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub id: Uuid,
    pub product_id: ProductId,
    pub product_description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl LineItem {
    /// unit_price × quantity, `None` unless the product is exactly representable
    pub fn subtotal(&self) -> Option<Decimal> {
        exact_product(self.unit_price, self.quantity)
    }
}

/// Decimal from a JSON string or number, rejecting input that would be rounded
fn exact_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    struct ExactDecimalVisitor;

    impl<'de> Visitor<'de> for ExactDecimalVisitor {
        type Value = Decimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an exactly representable decimal string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Decimal::from_str_exact(value.trim())
                .map_err(|e| de::Error::custom(format!("invalid decimal {}: {}", value, e)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Decimal::from(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Decimal::from(value))
        }

        // JSON numbers with a fraction arrive as f64; strings keep every digit
        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            self.visit_str(&value.to_string())
        }
    }

    deserializer.deserialize_any(ExactDecimalVisitor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    AwaitingPayment,
    Paid,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::AwaitingPayment,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    /// No transition of any kind leaves a terminal status
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::AwaitingPayment => "AWAITING_PAYMENT",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
