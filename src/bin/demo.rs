//! Wiring demo: build the three queues, run the engine on its own thread,
//! feed a small scripted order flow, and print everything that comes out.
//!
//! ```text
//! RUST_LOG=matchbook=trace cargo run --bin matchbook-demo
//! ```

use std::error::Error;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use matchbook::{
    ClientRequest, EngineConfig, MatchingEngine, RequestKind, Side, SpscQueue,
};

#[derive(Parser, Debug)]
#[command(name = "matchbook-demo", about = "Scripted matching-core walkthrough")]
struct Args {
    /// Pin the engine thread to this CPU core
    #[arg(long)]
    core: Option<usize>,

    /// Resting orders per side before the crossing flow
    #[arg(long, default_value_t = 3)]
    depth: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = EngineConfig {
        num_instruments: 1,
        max_orders: 1024,
        max_price_levels: 128,
        request_queue_capacity: 1024,
        response_queue_capacity: 4096,
        update_queue_capacity: 4096,
    };

    let (mut request_tx, request_rx) = SpscQueue::with_capacity(config.request_queue_capacity);
    let (response_tx, mut response_rx) = SpscQueue::with_capacity(config.response_queue_capacity);
    let (update_tx, mut update_rx) = SpscQueue::with_capacity(config.update_queue_capacity);

    let engine = MatchingEngine::new(&config, request_rx, response_tx, update_tx)?;
    let handle = engine.handle();
    let join = engine.spawn(args.core)?;

    // build a book: bids below 1000, asks above
    let mut order_id = 0u64;
    for i in 0..args.depth as i64 {
        order_id += 1;
        request_tx.push(ClientRequest {
            kind: RequestKind::New,
            client_id: 1,
            instrument_id: 0,
            order_id,
            side: Side::Buy,
            price: 990 - i,
            qty: 100,
        });
        order_id += 1;
        request_tx.push(ClientRequest {
            kind: RequestKind::New,
            client_id: 2,
            instrument_id: 0,
            order_id,
            side: Side::Sell,
            price: 1010 + i,
            qty: 100,
        });
    }

    // cross the spread, shrink an order in place, cancel another
    request_tx.push(ClientRequest {
        kind: RequestKind::New,
        client_id: 3,
        instrument_id: 0,
        order_id: 1001,
        side: Side::Buy,
        price: 1010,
        qty: 150,
    });
    request_tx.push(ClientRequest {
        kind: RequestKind::Modify,
        client_id: 1,
        instrument_id: 0,
        order_id: 1,
        side: Side::Buy,
        price: 990,
        qty: 40,
    });
    // order 2 (the 1010 offer) was consumed by the sweep, so cancel the
    // next offer out instead
    request_tx.push(ClientRequest {
        kind: RequestKind::Cancel,
        client_id: 2,
        instrument_id: 0,
        order_id: 4,
        side: Side::Invalid,
        price: 0,
        qty: 0,
    });

    // let the engine chew through the script
    thread::sleep(Duration::from_millis(200));

    println!("--- client responses ---");
    while let Some(response) = response_rx.pop() {
        println!(
            "{:?} client={} coid={} moid={} {:?} px={} exec={} leaves={}",
            response.kind,
            response.client_id,
            response.client_order_id,
            response.market_order_id,
            response.side,
            response.price,
            response.exec_qty,
            response.leaves_qty,
        );
    }

    println!("--- market updates ---");
    while let Some(update) = update_rx.pop() {
        println!(
            "{:?} moid={} {:?} px={} qty={} prio={}",
            update.kind, update.order_id, update.side, update.price, update.qty, update.priority,
        );
    }

    handle.stop();
    join.join().expect("engine thread panicked")?;
    Ok(())
}
