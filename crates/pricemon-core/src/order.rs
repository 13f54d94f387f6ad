//! Manually entered orders.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the quote an order overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Bid,
    Ask,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// An immutable manual trade intent.
///
/// Construction does not validate; [`Order::validate`] is checked by the
/// coordinator before any instrument field is touched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    price: f64,
    quantity: i64,
    side: OrderSide,
}

impl Order {
    pub fn new(price: f64, quantity: i64, side: OrderSide) -> Self {
        Self {
            price,
            quantity,
            side,
        }
    }

    /// Shorthand for a bid order.
    pub fn bid(price: f64, quantity: i64) -> Self {
        Self::new(price, quantity, OrderSide::Bid)
    }

    /// Shorthand for an ask order.
    pub fn ask(price: f64, quantity: i64) -> Self {
        Self::new(price, quantity, OrderSide::Ask)
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    /// Quantity as an unsigned value. Only meaningful after `validate`.
    pub fn quantity_u64(&self) -> u64 {
        self.quantity.max(0) as u64
    }

    /// Reject non-positive quantities and non-finite prices.
    pub fn validate(&self) -> Result<()> {
        if self.quantity <= 0 {
            return Err(CoreError::InvalidOrder(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if !self.price.is_finite() {
            return Err(CoreError::InvalidOrder(format!(
                "price must be finite, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}@{:.2}", self.side, self.quantity, self.price)
    }
}
