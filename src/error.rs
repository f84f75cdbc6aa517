//! Fatal error surface of the matching core.
//!
//! Expected conditions (cancel/modify of an unknown order) are typed
//! rejection responses on the client stream, never errors. What remains here
//! is the unrecoverable tier: capacity provisioning was violated or the
//! upstream sequencer handed us garbage. The engine loop logs these and
//! returns them to the host, which decides how to abort; there is no
//! degraded-mode operation for a matching engine.

use thiserror::Error;

use crate::pool::PoolError;
use crate::types::{InstrumentId, OrderId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("order pool exhausted")]
    OrderPoolExhausted(#[source] PoolError),

    #[error("price level pool exhausted")]
    LevelPoolExhausted(#[source] PoolError),

    /// Request referenced an instrument no book exists for.
    #[error("unknown instrument id {0}")]
    UnknownInstrument(InstrumentId),

    /// Request kind was the placeholder value; the sequencer must never
    /// forward one.
    #[error("invalid request kind for client order {0}")]
    InvalidRequest(OrderId),
}
