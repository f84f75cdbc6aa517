//! Determinism tests - golden master verification.
//!
//! The engine is a pure state machine over its input sequence: the same
//! requests must produce byte-identical response and update streams on
//! every run.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use matchbook::{
    ClientRequest, EngineConfig, MatchingEngine, RequestKind, Side, SpscQueue,
};

fn generate_requests(seed: u64, count: usize) -> Vec<ClientRequest> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut requests = Vec::with_capacity(count);
    let mut active: Vec<(u32, u64)> = Vec::new();
    let mut next_order_id = 1u64;

    for _ in 0..count {
        let roll: f64 = rng.gen();
        if active.is_empty() || roll < 0.6 {
            let order_id = next_order_id;
            next_order_id += 1;
            let client_id = rng.gen_range(1..32);
            requests.push(ClientRequest {
                kind: RequestKind::New,
                client_id,
                instrument_id: 0,
                order_id,
                side: if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
                price: rng.gen_range(9500..10500),
                qty: rng.gen_range(1..500),
            });
            active.push((client_id, order_id));
        } else if roll < 0.8 {
            let idx = rng.gen_range(0..active.len());
            let (client_id, order_id) = active[idx];
            requests.push(ClientRequest {
                kind: RequestKind::Modify,
                client_id,
                instrument_id: 0,
                order_id,
                side: Side::Invalid,
                price: rng.gen_range(9500..10500),
                qty: rng.gen_range(1..500),
            });
        } else {
            let idx = rng.gen_range(0..active.len());
            let (client_id, order_id) = active.swap_remove(idx);
            requests.push(ClientRequest {
                kind: RequestKind::Cancel,
                client_id,
                instrument_id: 0,
                order_id,
                ..ClientRequest::default()
            });
        }
    }

    requests
}

/// Run the request sequence and hash everything observable: both outbound
/// streams plus the final book shape.
fn run_engine(requests: &[ClientRequest]) -> u64 {
    let config = EngineConfig {
        num_instruments: 1,
        max_orders: 100_000,
        max_price_levels: 4096,
        request_queue_capacity: 16,
        response_queue_capacity: 64 * 1024,
        update_queue_capacity: 64 * 1024,
    };
    let (_request_tx, request_rx) = SpscQueue::with_capacity(config.request_queue_capacity);
    let (response_tx, mut response_rx) = SpscQueue::with_capacity(config.response_queue_capacity);
    let (update_tx, mut update_rx) = SpscQueue::with_capacity(config.update_queue_capacity);
    let mut engine = MatchingEngine::new(&config, request_rx, response_tx, update_tx).unwrap();

    let mut hasher = DefaultHasher::new();

    for request in requests {
        engine.process(request).unwrap();

        while let Some(response) = response_rx.pop() {
            (response.kind as u8).hash(&mut hasher);
            response.client_id.hash(&mut hasher);
            response.client_order_id.hash(&mut hasher);
            response.market_order_id.hash(&mut hasher);
            response.price.hash(&mut hasher);
            response.exec_qty.hash(&mut hasher);
            response.leaves_qty.hash(&mut hasher);
        }
        while let Some(update) = update_rx.pop() {
            (update.kind as u8).hash(&mut hasher);
            update.order_id.hash(&mut hasher);
            update.price.hash(&mut hasher);
            update.qty.hash(&mut hasher);
            update.priority.hash(&mut hasher);
        }
    }

    let book = engine.book(0).unwrap();
    book.best_bid().hash(&mut hasher);
    book.best_ask().hash(&mut hasher);
    book.order_count().hash(&mut hasher);

    hasher.finish()
}

#[test]
fn identical_runs_produce_identical_streams() {
    const SEED: u64 = 0xDEADBEEF;
    const COUNT: usize = 1_000;
    const RUNS: usize = 10;

    let requests = generate_requests(SEED, COUNT);
    let first = run_engine(&requests);

    for run in 1..RUNS {
        assert_eq!(run_engine(&requests), first, "stream hash mismatch on run {run}");
    }
}

#[test]
fn determinism_holds_at_scale() {
    const SEED: u64 = 0xCAFEBABE;
    const COUNT: usize = 50_000;
    const RUNS: usize = 3;

    let requests = generate_requests(SEED, COUNT);
    let first = run_engine(&requests);

    for run in 1..RUNS {
        assert_eq!(run_engine(&requests), first, "stream hash mismatch on run {run}");
    }
}

#[test]
fn different_seeds_diverge() {
    let first = run_engine(&generate_requests(1, 1_000));
    let second = run_engine(&generate_requests(2, 1_000));
    assert_ne!(first, second);
}
