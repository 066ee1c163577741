//! Domain events for the order lifecycle.

use serde::{Deserialize, Serialize};

use super::value_objects::OrderSide;
use crate::domain::shared::{CustomerId, Money, OrderId, Quantity, Symbol, Timestamp};

/// All possible order events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    /// Order placed and funds reserved.
    Created(OrderCreated),
    /// Order canceled and reservation released.
    Canceled(OrderCanceled),
    /// Order settled.
    Matched(OrderMatched),
}

impl OrderEvent {
    /// Get the order ID for this event.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        match self {
            Self::Created(e) => &e.order_id,
            Self::Canceled(e) => &e.order_id,
            Self::Matched(e) => &e.order_id,
        }
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub const fn occurred_at(&self) -> Timestamp {
        match self {
            Self::Created(e) => e.occurred_at,
            Self::Canceled(e) => e.occurred_at,
            Self::Matched(e) => e.occurred_at,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => "ORDER_CREATED",
            Self::Canceled(_) => "ORDER_CANCELED",
            Self::Matched(_) => "ORDER_MATCHED",
        }
    }
}

/// Event: order placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    /// Order ID.
    pub order_id: OrderId,
    /// Owner.
    pub customer_id: CustomerId,
    /// Asset traded.
    pub asset_name: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Size.
    pub size: Quantity,
    /// Unit price.
    pub price: Money,
    /// When.
    pub occurred_at: Timestamp,
}

/// Event: order canceled by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCanceled {
    /// Order ID.
    pub order_id: OrderId,
    /// Owner.
    pub customer_id: CustomerId,
    /// When.
    pub occurred_at: Timestamp,
}

/// Event: order settled at its stated price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMatched {
    /// Order ID.
    pub order_id: OrderId,
    /// Owner.
    pub customer_id: CustomerId,
    /// Asset traded.
    pub asset_name: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Size.
    pub size: Quantity,
    /// Settlement price.
    pub price: Money,
    /// When.
    pub occurred_at: Timestamp,
}
