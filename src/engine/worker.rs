//! Single-consumer worker owning the order engine.
//!
//! Producers (signal detection, the market-data feed) hold only the
//! channel sender, so their latency never blocks order bookkeeping and
//! vice versa. Every command failure is contained at its boundary; the
//! loop only exits on `Shutdown` or when all senders are gone, handing
//! the engine back for a final statistics pass.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::OrderEngine;
use crate::gateway::ExecutionGateway;
use crate::models::{Order, Tick};
use crate::notify::Notifier;

/// Command sent to the order worker.
#[derive(Debug)]
pub enum OrderCommand {
    /// Register a candidate order from the signal source.
    Create(Option<Order>),
    /// Evaluate a price tick against the book.
    Tick(Tick),
    /// Append a per-instrument summary pass to the stats files.
    WriteStats,
    /// Stop the worker and hand back the engine.
    Shutdown,
}

pub fn spawn_worker<G, N>(
    mut engine: OrderEngine<G, N>,
    capacity: usize,
) -> (mpsc::Sender<OrderCommand>, JoinHandle<OrderEngine<G, N>>)
where
    G: ExecutionGateway + Send + 'static,
    N: Notifier + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel(capacity);

    let handle = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                OrderCommand::Create(candidate) => {
                    if let Err(e) = engine.create_order(candidate).await {
                        tracing::error!("create order failed: {:#}", e);
                    }
                }
                OrderCommand::Tick(tick) => engine.on_tick(&tick).await,
                OrderCommand::WriteStats => engine.write_statistics(),
                OrderCommand::Shutdown => break,
            }
        }

        tracing::info!("order worker stopped");
        engine
    });

    (tx, handle)
}
