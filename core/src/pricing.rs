// core/src/pricing.rs

//! Input validation and pricing for new orders. No I/O happens here.

use std::collections::HashMap;

use crate::error::{OrderError, Result};
use crate::models::{NewOrder, OrderLine, OrderRequest, PricedItem};

pub const MISSING_USER_OR_ITEMS: &str = "an order needs a user and at least one item";
pub const QUANTITY_NOT_A_NUMBER: &str = "quantity must be a number";
pub const QUANTITY_NOT_POSITIVE: &str = "quantity must be positive";

/// Checks the request preconditions and returns the owning user id.
///
/// A missing user id, a zero user id and an empty item list are all rejected.
pub fn validate_request(request: &OrderRequest) -> Result<i64> {
  match request.user_id {
    Some(user_id) if user_id != 0 && !request.items.is_empty() => Ok(user_id),
    _ => Err(OrderError::validation(MISSING_USER_OR_ITEMS)),
  }
}

/// Prices every line against a snapshot of product prices.
///
/// Lines are checked in input order and the first failing line is reported:
/// quantity must be numeric, then positive, then the product must be known.
pub fn price_order(user_id: i64, lines: &[OrderLine], prices: &HashMap<i64, f64>) -> Result<NewOrder> {
  let mut total_amount = 0.0;
  let mut items = Vec::with_capacity(lines.len());

  for line in lines {
    let quantity = line
      .quantity
      .as_number()
      .ok_or_else(|| OrderError::validation(QUANTITY_NOT_A_NUMBER))?;
    if quantity <= 0.0 {
      return Err(OrderError::validation(QUANTITY_NOT_POSITIVE));
    }
    let unit_price = *prices
      .get(&line.product_id)
      .ok_or_else(|| OrderError::validation(format!("product {} does not exist", line.product_id)))?;

    let item = PricedItem {
      product_id: line.product_id,
      quantity,
      unit_price,
    };
    total_amount += item.subtotal();
    items.push(item);
  }

  Ok(NewOrder {
    user_id,
    total_amount,
    items,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Quantity;

  fn prices() -> HashMap<i64, f64> {
    HashMap::from([(1, 9.99), (2, 4.5)])
  }

  #[test]
  fn total_is_the_sum_of_snapshotted_subtotals() {
    let lines = vec![OrderLine::new(1, 2.0), OrderLine::new(2, "3")];
    let order = price_order(42, &lines, &prices()).unwrap();
    assert_eq!(order.user_id, 42);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[1].quantity, 3.0);
    assert_eq!(order.items[1].unit_price, 4.5);
    assert!((order.total_amount - (19.98 + 13.5)).abs() < 1e-9);
  }

  #[test]
  fn single_line_example_totals_19_98() {
    let order = price_order(42, &[OrderLine::new(1, 2.0)], &prices()).unwrap();
    assert_eq!(order.total_amount.to_string(), "19.98");
  }

  #[test]
  fn rejects_missing_user_zero_user_and_empty_items() {
    let empty = OrderRequest::new(42, vec![]);
    assert_eq!(
      validate_request(&empty).unwrap_err().to_string(),
      format!("Validation Error: {}", MISSING_USER_OR_ITEMS)
    );

    let zero_user = OrderRequest::new(0, vec![OrderLine::new(1, 1.0)]);
    assert!(validate_request(&zero_user).unwrap_err().is_validation());

    let no_user = OrderRequest {
      user_id: None,
      items: vec![OrderLine::new(1, 1.0)],
    };
    assert!(validate_request(&no_user).unwrap_err().is_validation());

    let ok = OrderRequest::new(42, vec![OrderLine::new(1, 1.0)]);
    assert_eq!(validate_request(&ok).unwrap(), 42);
  }

  #[test]
  fn rejects_non_numeric_and_non_positive_quantities() {
    let err = price_order(42, &[OrderLine::new(1, "abc")], &prices()).unwrap_err();
    assert!(matches!(err, OrderError::Validation(ref m) if m == QUANTITY_NOT_A_NUMBER));

    let null = OrderLine::new(1, Quantity::default());
    let err = price_order(42, &[null], &prices()).unwrap_err();
    assert!(matches!(err, OrderError::Validation(ref m) if m == QUANTITY_NOT_A_NUMBER));

    let err = price_order(42, &[OrderLine::new(1, -1.0)], &prices()).unwrap_err();
    assert!(matches!(err, OrderError::Validation(ref m) if m == QUANTITY_NOT_POSITIVE));

    let err = price_order(42, &[OrderLine::new(1, 0.0)], &prices()).unwrap_err();
    assert!(matches!(err, OrderError::Validation(ref m) if m == QUANTITY_NOT_POSITIVE));
  }

  #[test]
  fn reports_the_first_offending_line_in_input_order() {
    let lines = vec![
      OrderLine::new(1, 1.0),
      OrderLine::new(77, 1.0),
      OrderLine::new(88, -5.0),
    ];
    let err = price_order(42, &lines, &prices()).unwrap_err();
    assert!(matches!(err, OrderError::Validation(ref m) if m == "product 77 does not exist"));

    let lines = vec![OrderLine::new(88, -5.0), OrderLine::new(77, 1.0)];
    let err = price_order(42, &lines, &prices()).unwrap_err();
    assert!(matches!(err, OrderError::Validation(ref m) if m == QUANTITY_NOT_POSITIVE));
  }
}
