//! Outbound event fan-out.
//!
//! Owns the producer ends of the client-response and market-update queues
//! and traces every message it publishes. The matching thread is the sole
//! writer of both streams; external publishers consume the other ends.

use tracing::trace;

use crate::message::{ClientResponse, MarketUpdate};
use crate::queue::Producer;

pub struct Outbound {
    responses: Producer<ClientResponse>,
    updates: Producer<MarketUpdate>,
}

impl Outbound {
    pub fn new(responses: Producer<ClientResponse>, updates: Producer<MarketUpdate>) -> Self {
        Self { responses, updates }
    }

    #[inline]
    pub fn client_response(&mut self, response: ClientResponse) {
        trace!(?response, "sending client response");
        self.responses.push(response);
    }

    #[inline]
    pub fn market_update(&mut self, update: MarketUpdate) {
        trace!(?update, "sending market update");
        self.updates.push(update);
    }
}
