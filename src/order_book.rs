//! Order book - per-instrument matching state machine.
//!
//! Orchestrates add/cancel/modify against the price ladder and the order
//! index, running price-time priority matching. Every state change emits a
//! client response and/or a market update through [`Outbound`]; nothing is
//! returned to the caller except fatal capacity errors.
//!
//! One instance exists per instrument and is owned by exactly one thread.

use rustc_hash::FxHashMap;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ladder::Ladder;
use crate::message::{ClientResponse, MarketUpdate, ResponseKind, UpdateKind};
use crate::outbound::Outbound;
use crate::pool::{Pool, PoolIndex, NIL_INDEX};
use crate::types::{
    ClientId, InstrumentId, OrderId, Price, Priority, Qty, Side, NIL_CLIENT_ID, NIL_INSTRUMENT_ID,
    NIL_ORDER_ID, NIL_PRICE, NIL_PRIORITY, NIL_QTY,
};

/// A resting order node.
///
/// Owned by the book's order pool and referenced from exactly two places:
/// its level's FIFO ring (via `prev`/`next`) and the order index.
#[derive(Clone, Copy, Debug)]
pub struct Order {
    pub instrument_id: InstrumentId,
    pub client_id: ClientId,
    pub client_order_id: OrderId,
    pub market_order_id: OrderId,
    pub side: Side,
    pub price: Price,
    /// Leaves quantity; decremented in place on partial fills.
    pub qty: Qty,
    /// Arrival sequence within the level; never reassigned.
    pub priority: Priority,
    pub prev: PoolIndex,
    pub next: PoolIndex,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            instrument_id: NIL_INSTRUMENT_ID,
            client_id: NIL_CLIENT_ID,
            client_order_id: NIL_ORDER_ID,
            market_order_id: NIL_ORDER_ID,
            side: Side::Invalid,
            price: NIL_PRICE,
            qty: NIL_QTY,
            priority: NIL_PRIORITY,
            prev: NIL_INDEX,
            next: NIL_INDEX,
        }
    }
}

pub struct OrderBook {
    instrument_id: InstrumentId,
    orders: Pool<Order>,
    ladder: Ladder,
    /// (client id, client order id) -> live order handle.
    index: FxHashMap<(ClientId, OrderId), PoolIndex>,
    /// Never reused, never reset; ids are unique for the lifetime of this
    /// instrument's book.
    next_market_order_id: OrderId,
}

impl OrderBook {
    pub fn new(instrument_id: InstrumentId, config: &EngineConfig) -> Self {
        Self {
            instrument_id,
            orders: Pool::new(config.max_orders),
            ladder: Ladder::new(config.max_price_levels),
            index: FxHashMap::with_capacity_and_hasher(
                config.max_orders as usize,
                Default::default(),
            ),
            next_market_order_id: 1,
        }
    }

    /// Process a new order: acknowledge, match whatever crosses, rest the
    /// remainder.
    ///
    /// The ACCEPTED response goes out before matching is attempted, so a
    /// client always sees the acknowledgement ahead of any fills.
    pub fn add(
        &mut self,
        out: &mut Outbound,
        client_id: ClientId,
        client_order_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
    ) -> Result<(), EngineError> {
        let market_order_id = self.new_market_order_id();

        out.client_response(ClientResponse {
            kind: ResponseKind::Accepted,
            client_id,
            instrument_id: self.instrument_id,
            client_order_id,
            market_order_id,
            side,
            price,
            exec_qty: 0,
            leaves_qty: qty,
        });

        let leaves_qty = self.match_incoming(
            out,
            client_id,
            client_order_id,
            market_order_id,
            side,
            price,
            qty,
        );

        if leaves_qty > 0 {
            self.rest(
                out,
                client_id,
                client_order_id,
                market_order_id,
                side,
                price,
                leaves_qty,
            )?;
        }
        Ok(())
    }

    /// Cancel a resting order. An unknown (client, order) pair is a normal
    /// rejection, not an error; the book is unaffected.
    pub fn cancel(&mut self, out: &mut Outbound, client_id: ClientId, client_order_id: OrderId) {
        let Some(order_idx) = self.index.get(&(client_id, client_order_id)).copied() else {
            out.client_response(ClientResponse {
                kind: ResponseKind::CancelRejected,
                client_id,
                instrument_id: self.instrument_id,
                client_order_id,
                ..ClientResponse::default()
            });
            return;
        };

        let order = *self.orders.get(order_idx);
        out.client_response(ClientResponse {
            kind: ResponseKind::Canceled,
            client_id,
            instrument_id: self.instrument_id,
            client_order_id,
            market_order_id: order.market_order_id,
            side: order.side,
            price: order.price,
            exec_qty: NIL_QTY,
            leaves_qty: order.qty,
        });
        out.market_update(MarketUpdate {
            kind: UpdateKind::Cancel,
            order_id: order.market_order_id,
            instrument_id: self.instrument_id,
            side: order.side,
            price: order.price,
            qty: order.qty,
            priority: NIL_PRIORITY,
        });
        self.unlink(order_idx);
    }

    /// Modify a resting order.
    ///
    /// A price change, or a quantity above the current remainder, forfeits
    /// time priority: the order is cancelled and re-entered as a fresh add
    /// at the new terms. The re-entry matches immediately if it crosses and
    /// is assigned a NEW market order id - clients must track the identity
    /// change through the response stream. Shrinking in place at the same
    /// price keeps priority and triggers no matching, since a smaller order
    /// cannot newly cross the spread.
    pub fn modify(
        &mut self,
        out: &mut Outbound,
        client_id: ClientId,
        client_order_id: OrderId,
        new_price: Price,
        new_qty: Qty,
    ) -> Result<(), EngineError> {
        let Some(order_idx) = self.index.get(&(client_id, client_order_id)).copied() else {
            out.client_response(ClientResponse {
                kind: ResponseKind::ModifyRejected,
                client_id,
                instrument_id: self.instrument_id,
                client_order_id,
                ..ClientResponse::default()
            });
            return Ok(());
        };

        let order = *self.orders.get(order_idx);

        if new_price != order.price || new_qty > order.qty {
            out.client_response(ClientResponse {
                kind: ResponseKind::Canceled,
                client_id,
                instrument_id: self.instrument_id,
                client_order_id,
                market_order_id: order.market_order_id,
                side: order.side,
                price: order.price,
                exec_qty: NIL_QTY,
                leaves_qty: order.qty,
            });
            out.market_update(MarketUpdate {
                kind: UpdateKind::Cancel,
                order_id: order.market_order_id,
                instrument_id: self.instrument_id,
                side: order.side,
                price: order.price,
                qty: order.qty,
                priority: NIL_PRIORITY,
            });
            self.unlink(order_idx);
            return self.add(out, client_id, client_order_id, order.side, new_price, new_qty);
        }

        self.orders.get_mut(order_idx).qty = new_qty;
        out.client_response(ClientResponse {
            kind: ResponseKind::Modified,
            client_id,
            instrument_id: self.instrument_id,
            client_order_id,
            market_order_id: order.market_order_id,
            side: order.side,
            price: order.price,
            exec_qty: NIL_QTY,
            leaves_qty: new_qty,
        });
        out.market_update(MarketUpdate {
            kind: UpdateKind::Modify,
            order_id: order.market_order_id,
            instrument_id: self.instrument_id,
            side: order.side,
            price: order.price,
            qty: new_qty,
            priority: order.priority,
        });
        Ok(())
    }

    /// Drop every resting order and level, returning the book to empty, and
    /// tell market-data consumers to discard their state for this
    /// instrument. Market order ids keep counting.
    pub fn clear(&mut self, out: &mut Outbound) {
        let resting: Vec<PoolIndex> = self.index.values().copied().collect();
        for order_idx in resting {
            self.orders.free(order_idx);
        }
        self.index.clear();
        self.ladder.clear();

        out.market_update(MarketUpdate {
            kind: UpdateKind::Clear,
            instrument_id: self.instrument_id,
            ..MarketUpdate::default()
        });
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Match an incoming order against the opposite side while it crosses.
    /// Returns the unfilled remainder.
    fn match_incoming(
        &mut self,
        out: &mut Outbound,
        client_id: ClientId,
        client_order_id: OrderId,
        market_order_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
    ) -> Qty {
        let mut leaves_qty = qty;

        while leaves_qty > 0 {
            let best = self.ladder.best(side.opposite());
            if best == NIL_INDEX {
                break;
            }
            let best_level = *self.ladder.level(best);
            if !Self::crosses(side, price, best_level.price) {
                break;
            }
            // FIFO within the level: always the oldest order
            leaves_qty = self.fill(
                out,
                client_id,
                client_order_id,
                market_order_id,
                side,
                leaves_qty,
                best_level.first_order,
            );
        }

        leaves_qty
    }

    /// Does an incoming price cross the opposite touch?
    #[inline]
    fn crosses(side: Side, price: Price, opposite_best: Price) -> bool {
        match side {
            Side::Buy => price >= opposite_best,
            Side::Sell => price <= opposite_best,
            Side::Invalid => false,
        }
    }

    /// Execute one fill between the incoming order and a resting order.
    /// The resting side always sets the trade price, so price improvement
    /// goes to the standing order. Returns the incoming leaves.
    fn fill(
        &mut self,
        out: &mut Outbound,
        client_id: ClientId,
        client_order_id: OrderId,
        market_order_id: OrderId,
        side: Side,
        leaves_qty: Qty,
        resting_idx: PoolIndex,
    ) -> Qty {
        let resting = *self.orders.get(resting_idx);
        let fill_qty = leaves_qty.min(resting.qty);
        let leaves_qty = leaves_qty - fill_qty;

        // aggressor's report first, then the resting owner's
        out.client_response(ClientResponse {
            kind: ResponseKind::Filled,
            client_id,
            instrument_id: self.instrument_id,
            client_order_id,
            market_order_id,
            side,
            price: resting.price,
            exec_qty: fill_qty,
            leaves_qty,
        });
        out.client_response(ClientResponse {
            kind: ResponseKind::Filled,
            client_id: resting.client_id,
            instrument_id: self.instrument_id,
            client_order_id: resting.client_order_id,
            market_order_id: resting.market_order_id,
            side: resting.side,
            price: resting.price,
            exec_qty: fill_qty,
            leaves_qty: resting.qty - fill_qty,
        });
        out.market_update(MarketUpdate {
            kind: UpdateKind::Trade,
            order_id: NIL_ORDER_ID,
            instrument_id: self.instrument_id,
            side,
            price: resting.price,
            qty: fill_qty,
            priority: NIL_PRIORITY,
        });

        if fill_qty == resting.qty {
            // resting order consumed: it leaves the public book entirely
            out.market_update(MarketUpdate {
                kind: UpdateKind::Cancel,
                order_id: resting.market_order_id,
                instrument_id: self.instrument_id,
                side: resting.side,
                price: resting.price,
                qty: resting.qty,
                priority: NIL_PRIORITY,
            });
            self.unlink(resting_idx);
        } else {
            let remaining = resting.qty - fill_qty;
            self.orders.get_mut(resting_idx).qty = remaining;
            out.market_update(MarketUpdate {
                kind: UpdateKind::Modify,
                order_id: resting.market_order_id,
                instrument_id: self.instrument_id,
                side: resting.side,
                price: resting.price,
                qty: remaining,
                priority: resting.priority,
            });
        }

        leaves_qty
    }

    // ========================================================================
    // Book structure maintenance
    // ========================================================================

    /// Rest the unfilled remainder of an order in the book.
    fn rest(
        &mut self,
        out: &mut Outbound,
        client_id: ClientId,
        client_order_id: OrderId,
        market_order_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
    ) -> Result<(), EngineError> {
        let priority = self.priority_at(price);
        let order_idx = self
            .orders
            .alloc(Order {
                instrument_id: self.instrument_id,
                client_id,
                client_order_id,
                market_order_id,
                side,
                price,
                qty,
                priority,
                prev: NIL_INDEX,
                next: NIL_INDEX,
            })
            .map_err(EngineError::OrderPoolExhausted)?;

        self.link(order_idx)?;
        self.index.insert((client_id, client_order_id), order_idx);

        out.market_update(MarketUpdate {
            kind: UpdateKind::Add,
            order_id: market_order_id,
            instrument_id: self.instrument_id,
            side,
            price,
            qty,
            priority,
        });
        Ok(())
    }

    /// Arrival priority for a new order at `price`: one past the oldest
    /// resting order's, or 1 for a fresh level.
    #[inline]
    fn priority_at(&self, price: Price) -> Priority {
        let level_idx = self.ladder.lookup(price);
        if level_idx == NIL_INDEX {
            1
        } else {
            self.orders
                .get(self.ladder.level(level_idx).first_order)
                .priority
                + 1
        }
    }

    /// Splice an order into the FIFO ring at its price, creating and
    /// splicing the level when this is the first order there. Frees the
    /// order and reports the level-pool error if the level cannot be
    /// created.
    fn link(&mut self, order_idx: PoolIndex) -> Result<(), EngineError> {
        let order = *self.orders.get(order_idx);
        let level_idx = self.ladder.lookup(order.price);

        if level_idx == NIL_INDEX {
            // a ring of one, then a fresh level around it
            self.orders.get_mut(order_idx).prev = order_idx;
            self.orders.get_mut(order_idx).next = order_idx;
            if let Err(e) = self.ladder.insert(order.side, order.price, order_idx) {
                self.orders.free(order_idx);
                return Err(EngineError::LevelPoolExhausted(e));
            }
        } else {
            // append at the ring tail: just before the oldest order
            let first = self.ladder.level(level_idx).first_order;
            let last = self.orders.get(first).prev;
            self.orders.get_mut(last).next = order_idx;
            self.orders.get_mut(order_idx).prev = last;
            self.orders.get_mut(order_idx).next = first;
            self.orders.get_mut(first).prev = order_idx;
        }
        Ok(())
    }

    /// Unlink an order from its level's ring (dropping the level when it
    /// empties), clear its index entry, and return it to the pool.
    fn unlink(&mut self, order_idx: PoolIndex) {
        let order = *self.orders.get(order_idx);
        let level_idx = self.ladder.lookup(order.price);
        debug_assert!(level_idx != NIL_INDEX, "resting order without a level");

        if order.next == order_idx {
            // only order at this price: the level goes with it
            self.ladder.remove(level_idx);
        } else {
            self.orders.get_mut(order.prev).next = order.next;
            self.orders.get_mut(order.next).prev = order.prev;
            let level = self.ladder.level_mut(level_idx);
            if level.first_order == order_idx {
                level.first_order = order.next;
            }
        }

        self.index.remove(&(order.client_id, order.client_order_id));
        self.orders.free(order_idx);
    }

    #[inline]
    fn new_market_order_id(&mut self) -> OrderId {
        let id = self.next_market_order_id;
        self.next_market_order_id += 1;
        id
    }

    // ========================================================================
    // Observers
    // ========================================================================

    #[inline]
    pub fn instrument_id(&self) -> InstrumentId {
        self.instrument_id
    }

    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.ladder.best_price(Side::Buy)
    }

    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.ladder.best_price(Side::Sell)
    }

    /// Number of resting orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total resting quantity and order count at an exact price.
    pub fn depth_at(&self, side: Side, price: Price) -> (u64, u32) {
        let level_idx = self.ladder.lookup(price);
        if level_idx == NIL_INDEX || self.ladder.level(level_idx).side != side {
            return (0, 0);
        }

        let first = self.ladder.level(level_idx).first_order;
        let mut total_qty = 0u64;
        let mut count = 0u32;
        let mut current = first;
        loop {
            total_qty += self.orders.get(current).qty as u64;
            count += 1;
            current = self.orders.get(current).next;
            if current == first {
                break;
            }
        }
        (total_qty, count)
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("instrument_id", &self.instrument_id)
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("order_count", &self.order_count())
            .finish()
    }
}
