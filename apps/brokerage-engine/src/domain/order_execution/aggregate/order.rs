//! Order Aggregate Root
//!
//! An order is placed PENDING with a matching balance reservation and
//! later transitions exactly once to MATCHED or CANCELED. The aggregate
//! decides which balance lines each transition touches; applying those
//! movements is the job of the balance reservation engine.

use serde::{Deserialize, Serialize};

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::events::{
    OrderCanceled, OrderCreated, OrderEvent, OrderMatched,
};
use crate::domain::order_execution::services::OrderStateMachine;
use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus};
use crate::domain::shared::{CustomerId, Money, OrderId, Quantity, Symbol, Timestamp};

/// A movement against one balance line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLeg {
    /// Balance line symbol.
    pub asset_name: Symbol,
    /// Amount moved.
    pub amount: Quantity,
}

/// The two balance movements that settle an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Reserved at placement, consumed now (`size` decreases).
    pub debit: BalanceLeg,
    /// Received in exchange (`size` and `usable_size` increase).
    pub credit: BalanceLeg,
}

/// Parameters for reconstituting an Order from storage.
///
/// No domain events are generated during reconstitution.
#[derive(Debug, Clone)]
pub struct ReconstitutedOrderParams {
    /// Order identifier.
    pub id: OrderId,
    /// Owner.
    pub customer_id: CustomerId,
    /// Asset being traded.
    pub asset_name: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Size.
    pub size: Quantity,
    /// Unit price in the base currency.
    pub price: Money,
    /// Current status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub create_date: Timestamp,
    /// Last update timestamp.
    pub updated_at: Timestamp,
    /// Optimistic concurrency version.
    pub version: u64,
}

/// Command to place a new order.
#[derive(Debug, Clone)]
pub struct PlaceOrderCommand {
    /// Owner.
    pub customer_id: CustomerId,
    /// Asset to trade.
    pub asset_name: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Size.
    pub size: Quantity,
    /// Unit price in the base currency.
    pub price: Money,
}

impl PlaceOrderCommand {
    /// Validate the command parameters.
    ///
    /// Checked in order: size, price, then that the asset is not the base
    /// currency itself.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for the first failing check.
    pub fn validate(&self, base_currency: &Symbol) -> Result<(), OrderError> {
        self.size
            .validate_for_order()
            .map_err(|e| OrderError::InvalidParameters {
                field: "size".to_string(),
                message: e.to_string(),
            })?;

        self.price
            .validate_for_order()
            .map_err(|e| OrderError::InvalidParameters {
                field: "price".to_string(),
                message: e.to_string(),
            })?;

        if &self.asset_name == base_currency {
            return Err(OrderError::InvalidParameters {
                field: "asset_name".to_string(),
                message: format!("Cannot trade {base_currency} asset directly"),
            });
        }

        self.asset_name
            .validate()
            .map_err(|e| OrderError::InvalidParameters {
                field: "asset_name".to_string(),
                message: e.to_string(),
            })?;

        self.size
            .notional(self.price)
            .map_err(|e| OrderError::InvalidParameters {
                field: "price".to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

/// Order Aggregate Root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    asset_name: Symbol,
    side: OrderSide,
    size: Quantity,
    price: Money,
    status: OrderStatus,
    create_date: Timestamp,
    updated_at: Timestamp,
    version: u64,
    #[serde(skip)]
    events: Vec<OrderEvent>,
}

impl Order {
    /// Place a new PENDING order.
    ///
    /// Generates an `OrderCreated` event.
    ///
    /// # Errors
    ///
    /// Returns error if command validation fails.
    pub fn place(cmd: PlaceOrderCommand, base_currency: &Symbol) -> Result<Self, OrderError> {
        cmd.validate(base_currency)?;

        let id = OrderId::generate();
        let now = Timestamp::now();

        let mut order = Self {
            id: id.clone(),
            customer_id: cmd.customer_id.clone(),
            asset_name: cmd.asset_name.clone(),
            side: cmd.side,
            size: cmd.size,
            price: cmd.price,
            status: OrderStatus::Pending,
            create_date: now,
            updated_at: now,
            version: 0,
            events: Vec::new(),
        };

        order.events.push(OrderEvent::Created(OrderCreated {
            order_id: id,
            customer_id: cmd.customer_id,
            asset_name: cmd.asset_name,
            side: cmd.side,
            size: cmd.size,
            price: cmd.price,
            occurred_at: now,
        }));

        Ok(order)
    }

    /// Reconstitute an order from stored state (no events generated).
    #[must_use]
    pub fn reconstitute(params: ReconstitutedOrderParams) -> Self {
        Self {
            id: params.id,
            customer_id: params.customer_id,
            asset_name: params.asset_name,
            side: params.side,
            size: params.size,
            price: params.price,
            status: params.status,
            create_date: params.create_date,
            updated_at: params.updated_at,
            version: params.version,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Get the owning customer.
    #[must_use]
    pub const fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Get the traded asset.
    #[must_use]
    pub const fn asset_name(&self) -> &Symbol {
        &self.asset_name
    }

    /// Get the order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Get the order size.
    #[must_use]
    pub const fn size(&self) -> Quantity {
        self.size
    }

    /// Get the unit price.
    #[must_use]
    pub const fn price(&self) -> Money {
        self.price
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// When the order was placed. Never changes.
    #[must_use]
    pub const fn create_date(&self) -> Timestamp {
        self.create_date
    }

    /// Last status change.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Optimistic concurrency version of the stored row.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Set by the store after a successful conditional write.
    pub(crate) const fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Returns true if the order is still PENDING.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    // ========================================================================
    // Balance legs
    // ========================================================================

    /// The balance line and amount reserved while this order is PENDING.
    ///
    /// BUY reserves `size * price` of the base currency; SELL reserves
    /// `size` of the traded asset.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if `size * price` overflows.
    pub fn reservation(&self, base_currency: &Symbol) -> Result<BalanceLeg, OrderError> {
        match self.side {
            OrderSide::Buy => Ok(BalanceLeg {
                asset_name: base_currency.clone(),
                amount: self.notional()?,
            }),
            OrderSide::Sell => Ok(BalanceLeg {
                asset_name: self.asset_name.clone(),
                amount: self.size,
            }),
        }
    }

    /// The movements that settle this order at its stated price.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if `size * price` overflows.
    pub fn settlement(&self, base_currency: &Symbol) -> Result<Settlement, OrderError> {
        let debit = self.reservation(base_currency)?;
        let credit = match self.side {
            OrderSide::Buy => BalanceLeg {
                asset_name: self.asset_name.clone(),
                amount: self.size,
            },
            OrderSide::Sell => BalanceLeg {
                asset_name: base_currency.clone(),
                amount: self.notional()?,
            },
        };
        Ok(Settlement { debit, credit })
    }

    fn notional(&self) -> Result<Quantity, OrderError> {
        self.size
            .notional(self.price)
            .map_err(|e| OrderError::InvalidParameters {
                field: "price".to_string(),
                message: e.to_string(),
            })
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Transition PENDING -> CANCELED.
    ///
    /// Generates an `OrderCanceled` event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the order is PENDING.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Canceled)?;

        let now = Timestamp::now();
        self.status = OrderStatus::Canceled;
        self.updated_at = now;

        self.events.push(OrderEvent::Canceled(OrderCanceled {
            order_id: self.id.clone(),
            customer_id: self.customer_id.clone(),
            occurred_at: now,
        }));

        Ok(())
    }

    /// Transition PENDING -> MATCHED.
    ///
    /// Generates an `OrderMatched` event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the order is PENDING.
    pub fn mark_matched(&mut self) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Matched)?;

        let now = Timestamp::now();
        self.status = OrderStatus::Matched;
        self.updated_at = now;

        self.events.push(OrderEvent::Matched(OrderMatched {
            order_id: self.id.clone(),
            customer_id: self.customer_id.clone(),
            asset_name: self.asset_name.clone(),
            side: self.side,
            size: self.size,
            price: self.price,
            occurred_at: now,
        }));

        Ok(())
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Take all pending domain events, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending domain events (not yet drained).
    #[must_use]
    pub fn events(&self) -> &[OrderEvent] {
        &self.events
    }
}
