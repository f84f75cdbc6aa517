//! Request and event message types carried over the SPSC queues.
//!
//! Requests flow in from the order gateway; client responses and market
//! updates flow out to the response publisher and the market-data publisher.
//! Layouts here are transport-agnostic: byte-level wire encoding belongs to
//! those collaborators.
//!
//! Every type is `Copy` and `Default` because queue slots are pre-filled
//! with placeholder values that producers overwrite in place.

use crate::types::{
    ClientId, InstrumentId, OrderId, Price, Priority, Qty, Side, NIL_CLIENT_ID, NIL_INSTRUMENT_ID,
    NIL_ORDER_ID, NIL_PRICE, NIL_PRIORITY, NIL_QTY,
};

// ============================================================================
// Inbound requests
// ============================================================================

/// Client action kinds accepted by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestKind {
    #[default]
    Invalid = 0,
    New = 1,
    Cancel = 2,
    Modify = 3,
}

/// One client action, produced by the gateway/sequencer.
///
/// For `Cancel`, `side`/`price`/`qty` are ignored; for `Modify` they carry
/// the requested new terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientRequest {
    pub kind: RequestKind,
    pub client_id: ClientId,
    pub instrument_id: InstrumentId,
    /// Client-assigned order id the action refers to.
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub qty: Qty,
}

impl Default for ClientRequest {
    fn default() -> Self {
        Self {
            kind: RequestKind::Invalid,
            client_id: NIL_CLIENT_ID,
            instrument_id: NIL_INSTRUMENT_ID,
            order_id: NIL_ORDER_ID,
            side: Side::Invalid,
            price: NIL_PRICE,
            qty: NIL_QTY,
        }
    }
}

// ============================================================================
// Outbound client responses
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseKind {
    #[default]
    Invalid = 0,
    Accepted = 1,
    Canceled = 2,
    Modified = 3,
    Filled = 4,
    CancelRejected = 5,
    ModifyRejected = 6,
}

/// Per-client acknowledgement/execution report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientResponse {
    pub kind: ResponseKind,
    pub client_id: ClientId,
    pub instrument_id: InstrumentId,
    pub client_order_id: OrderId,
    /// Engine-assigned id; changes when a modify re-enters the book.
    pub market_order_id: OrderId,
    pub side: Side,
    pub price: Price,
    /// Quantity executed by the event this response reports.
    pub exec_qty: Qty,
    /// Unexecuted remainder after the event.
    pub leaves_qty: Qty,
}

impl Default for ClientResponse {
    fn default() -> Self {
        Self {
            kind: ResponseKind::Invalid,
            client_id: NIL_CLIENT_ID,
            instrument_id: NIL_INSTRUMENT_ID,
            client_order_id: NIL_ORDER_ID,
            market_order_id: NIL_ORDER_ID,
            side: Side::Invalid,
            price: NIL_PRICE,
            exec_qty: NIL_QTY,
            leaves_qty: NIL_QTY,
        }
    }
}

// ============================================================================
// Outbound market updates
// ============================================================================

/// Anonymous book/trade event kinds for the market-data stream.
///
/// `Clear` tells recipients to discard all tracked state for the
/// instrument; `SnapshotStart`/`SnapshotEnd` bracket replays produced by
/// downstream snapshot tooling and are never emitted by the matching core
/// itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UpdateKind {
    #[default]
    Invalid = 0,
    Clear = 1,
    Add = 2,
    Modify = 3,
    Cancel = 4,
    Trade = 5,
    SnapshotStart = 6,
    SnapshotEnd = 7,
}

/// One incremental change to the public book.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarketUpdate {
    pub kind: UpdateKind,
    /// Market order id of the affected order; nil for trades and clears.
    pub order_id: OrderId,
    pub instrument_id: InstrumentId,
    /// For trades, the aggressor's side.
    pub side: Side,
    pub price: Price,
    pub qty: Qty,
    pub priority: Priority,
}

impl Default for MarketUpdate {
    fn default() -> Self {
        Self {
            kind: UpdateKind::Invalid,
            order_id: NIL_ORDER_ID,
            instrument_id: NIL_INSTRUMENT_ID,
            side: Side::Invalid,
            price: NIL_PRICE,
            qty: NIL_QTY,
            priority: NIL_PRIORITY,
        }
    }
}
