//! Order DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::{Order, OrderSide, OrderStatus, PlaceOrderCommand};
use crate::domain::shared::{CustomerId, Money, Quantity, Symbol, Timestamp};

/// DTO for placing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderDto {
    /// Customer placing the order.
    pub customer_id: String,
    /// Asset to trade.
    pub asset_name: String,
    /// Side.
    pub side: OrderSide,
    /// Size.
    pub size: Decimal,
    /// Unit price in the base currency.
    pub price: Decimal,
}

impl CreateOrderDto {
    /// Convert to the domain command.
    #[must_use]
    pub fn to_command(&self) -> PlaceOrderCommand {
        PlaceOrderCommand {
            customer_id: CustomerId::new(&self.customer_id),
            asset_name: Symbol::new(&self.asset_name),
            side: self.side,
            size: Quantity::new(self.size),
            price: Money::new(self.price),
        }
    }
}

/// Filter for listing a customer's orders.
#[derive(Debug, Clone)]
pub struct ListOrdersQuery {
    /// Customer whose orders to list.
    pub customer_id: CustomerId,
    /// Earliest creation time, inclusive.
    pub from: Timestamp,
    /// Latest creation time, inclusive.
    pub to: Timestamp,
}

/// DTO representing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDto {
    /// Order ID.
    pub id: String,
    /// Owner.
    pub customer_id: String,
    /// Asset traded.
    pub asset_name: String,
    /// Side.
    pub side: OrderSide,
    /// Size.
    pub size: Decimal,
    /// Unit price.
    pub price: Decimal,
    /// Status.
    pub status: OrderStatus,
    /// Creation time.
    pub create_date: Timestamp,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            asset_name: order.asset_name().to_string(),
            side: order.side(),
            size: order.size().amount(),
            price: order.price().amount(),
            status: order.status(),
            create_date: order.create_date(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn create_dto_deserializes_and_normalizes_symbol() {
        let dto: CreateOrderDto = serde_json::from_str(
            r#"{"customer_id":"john","asset_name":"aapl","side":"BUY","size":"10","price":"50.5"}"#,
        )
        .unwrap();
        let cmd = dto.to_command();
        assert_eq!(cmd.asset_name.as_str(), "AAPL");
        assert_eq!(cmd.size, Quantity::new(dec!(10)));
        assert_eq!(cmd.price, Money::new(dec!(50.5)));
    }

    #[test]
    fn order_dto_projection() {
        let order = Order::place(
            PlaceOrderCommand {
                customer_id: CustomerId::new("john"),
                asset_name: Symbol::new("AAPL"),
                side: OrderSide::Sell,
                size: Quantity::from_i64(5),
                price: Money::new(dec!(100)),
            },
            &Symbol::new("TRY"),
        )
        .unwrap();
        let dto = OrderDto::from(&order);
        assert_eq!(dto.status, OrderStatus::Pending);
        assert_eq!(dto.side, OrderSide::Sell);
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["size"], "5");
    }
}
