//! # Matchbook
//!
//! A fixed-capacity, price-time priority exchange matching core.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one thread owns each instrument's book exclusively
//!   (no locks anywhere)
//! - **Fixed Capacity**: pools and queues are provisioned at startup; the
//!   hot path never allocates, and exhaustion is a provisioning error, not
//!   a runtime condition
//! - **Handle-Linked Structures**: orders and price levels live in pools
//!   and reference each other by `u32` index, giving O(1) insert and cancel
//!   and FIFO matching without raw pointers
//!
//! ## Architecture
//!
//! ```text
//! [Gateway Thread] --> [request SPSC] --> [Engine Thread]
//!                                          |          |
//!                              [response SPSC]   [market-update SPSC]
//!                                          |          |
//!                            [Response Publisher] [Market Data Publisher]
//! ```
//!
//! The engine thread drains client requests and mutates the books; every
//! state change emits a client response and/or an anonymous market update
//! into the outbound queues. Transports and byte-level encodings live in the
//! processes on the other ends of the queues.

pub mod config;
pub mod engine;
pub mod error;
pub mod ladder;
pub mod message;
pub mod order_book;
pub mod outbound;
pub mod pool;
pub mod queue;
pub mod types;

// Re-exports for convenience
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineHandle, MatchingEngine};
pub use error::EngineError;
pub use ladder::{Ladder, PriceLevel};
pub use message::{
    ClientRequest, ClientResponse, MarketUpdate, RequestKind, ResponseKind, UpdateKind,
};
pub use order_book::{Order, OrderBook};
pub use outbound::Outbound;
pub use pool::{Pool, PoolError, PoolIndex, NIL_INDEX};
pub use queue::{Consumer, Producer, SpscQueue};
pub use types::{
    ClientId, InstrumentId, OrderId, Price, Priority, Qty, Side, NIL_CLIENT_ID,
    NIL_INSTRUMENT_ID, NIL_ORDER_ID, NIL_PRICE, NIL_PRIORITY, NIL_QTY,
};
