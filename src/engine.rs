//! Matching engine - one dedicated thread draining the request queue into
//! the per-instrument books.
//!
//! The engine thread is the sole reader of the request queue and the sole
//! writer of both outbound queues; book operations never suspend, block, or
//! yield. Shutdown is cooperative: [`EngineHandle::stop`] clears a shared
//! flag the loop observes on its next poll. Once a request is dequeued it
//! runs to completion.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info, trace};

use crate::config::{ConfigError, EngineConfig};
use crate::error::EngineError;
use crate::message::{ClientRequest, ClientResponse, MarketUpdate, RequestKind};
use crate::order_book::OrderBook;
use crate::outbound::Outbound;
use crate::queue::{Consumer, Producer};
use crate::types::InstrumentId;

pub struct MatchingEngine {
    books: Vec<OrderBook>,
    requests: Consumer<ClientRequest>,
    outbound: Outbound,
    running: Arc<AtomicBool>,
}

impl MatchingEngine {
    /// Build the engine over externally constructed queue endpoints: the
    /// consumer end of the gateway's request queue and the producer ends of
    /// the two publisher queues.
    pub fn new(
        config: &EngineConfig,
        requests: Consumer<ClientRequest>,
        responses: Producer<ClientResponse>,
        updates: Producer<MarketUpdate>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let books = (0..config.num_instruments)
            .map(|instrument| OrderBook::new(instrument as InstrumentId, config))
            .collect();

        Ok(Self {
            books,
            requests,
            outbound: Outbound::new(responses, updates),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Shutdown handle, cloneable across threads.
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Process a single client request against its instrument's book.
    pub fn process(&mut self, request: &ClientRequest) -> Result<(), EngineError> {
        trace!(?request, "processing client request");

        let book = self
            .books
            .get_mut(request.instrument_id as usize)
            .ok_or(EngineError::UnknownInstrument(request.instrument_id))?;

        match request.kind {
            RequestKind::New => book.add(
                &mut self.outbound,
                request.client_id,
                request.order_id,
                request.side,
                request.price,
                request.qty,
            ),
            RequestKind::Cancel => {
                book.cancel(&mut self.outbound, request.client_id, request.order_id);
                Ok(())
            }
            RequestKind::Modify => book.modify(
                &mut self.outbound,
                request.client_id,
                request.order_id,
                request.price,
                request.qty,
            ),
            RequestKind::Invalid => Err(EngineError::InvalidRequest(request.order_id)),
        }
    }

    /// Drain requests until the running flag clears. Busy-spins between
    /// polls; never blocks. A fatal error is logged and returned so the
    /// host can alert before aborting.
    pub fn run(&mut self) -> Result<(), EngineError> {
        info!(instruments = self.books.len(), "matching engine running");

        while self.running.load(Ordering::Acquire) {
            match self.requests.pop() {
                Some(request) => {
                    if let Err(e) = self.process(&request) {
                        error!(error = %e, "fatal engine error");
                        return Err(e);
                    }
                }
                None => std::hint::spin_loop(),
            }
        }

        info!("matching engine stopped");
        Ok(())
    }

    /// Move the engine onto its own named thread, optionally pinned to a
    /// CPU core. Pinning is best-effort: a core id that does not exist on
    /// this host is ignored.
    pub fn spawn(
        mut self,
        pin_core: Option<usize>,
    ) -> io::Result<JoinHandle<Result<(), EngineError>>> {
        thread::Builder::new()
            .name("matching-engine".into())
            .spawn(move || {
                if let Some(core) = pin_core {
                    pin_to_core(core);
                }
                self.run()
            })
    }

    /// The book for an instrument, if one was provisioned.
    pub fn book(&self, instrument_id: InstrumentId) -> Option<&OrderBook> {
        self.books.get(instrument_id as usize)
    }
}

/// Cooperative shutdown switch for a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    running: Arc<AtomicBool>,
}

impl EngineHandle {
    /// Observed by the engine on its next poll iteration.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

fn pin_to_core(core: usize) {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(id) = core_ids.into_iter().find(|c| c.id == core) {
            core_affinity::set_for_current(id);
        }
    }
}
