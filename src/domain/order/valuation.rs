use rust_decimal::Decimal;
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::{LineItem, LineItemInput};

// ============================================================================
// Line-Item Valuation
// ============================================================================

/// Validated items and their exact total
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

/// Validate requested items and sum unit_price × quantity in input order.
///
/// The first offending item aborts the whole valuation, so callers never
/// see a partially valued order. An empty input values to zero.
pub fn value_items(inputs: &[LineItemInput]) -> Result<Valuation, OrderError> {
    let mut items = Vec::with_capacity(inputs.len());
    let mut total = Decimal::ZERO;

    for (index, input) in inputs.iter().enumerate() {
        if input.quantity < 1 {
            return Err(OrderError::Validation {
                index,
                field: "quantity",
                reason: format!("must be at least 1, got {}", input.quantity),
            });
        }
        if input.unit_price.is_sign_negative() && !input.unit_price.is_zero() {
            return Err(OrderError::Validation {
                index,
                field: "unit_price",
                reason: format!("must be non-negative, got {}", input.unit_price),
            });
        }

        let item = LineItem {
            id: Uuid::now_v7(),
            product_id: input.product_id,
            product_description: input.product_description.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
        };

        total = item
            .subtotal()
            .and_then(|subtotal| exact_sum(total, subtotal))
            .ok_or_else(|| OrderError::Validation {
                index,
                field: "unit_price",
                reason: "exceeds exact decimal range or precision".to_string(),
            })?;

        items.push(item);
    }

    Ok(Valuation { items, total })
}

// Decimal's checked ops only fail on overflow; past 28 significant digits
// they lower the scale and round. A result keeping the operand scale is
// exact, otherwise the digits are recomputed on the i128 mantissa.

/// `price × quantity`, or `None` when the exact product is not representable
pub fn exact_product(price: Decimal, quantity: i32) -> Option<Decimal> {
    let product = price.checked_mul(Decimal::from(quantity))?;
    if product.scale() >= price.scale() {
        return Some(product);
    }

    let price = price.normalize();
    let mantissa = price.mantissa().checked_mul(i128::from(quantity))?;
    from_exact_parts(mantissa, price.scale())
}

/// `a + b`, or `None` when the exact sum is not representable
pub fn exact_sum(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    if sum.scale() >= a.scale().max(b.scale()) {
        return Some(sum);
    }

    let (a, b) = (a.normalize(), b.normalize());
    let scale = a.scale().max(b.scale());
    let aligned = |d: Decimal| -> Option<i128> {
        d.mantissa().checked_mul(10i128.checked_pow(scale - d.scale())?)
    };
    let mantissa = aligned(a)?.checked_add(aligned(b)?)?;
    from_exact_parts(mantissa, scale)
}

fn from_exact_parts(mut mantissa: i128, mut scale: u32) -> Option<Decimal> {
    while scale > 0 && mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}
