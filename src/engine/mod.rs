pub mod duplicate;
pub mod session;
pub mod worker;

pub use duplicate::DuplicateGuard;
pub use session::SessionWindow;
pub use worker::{spawn_worker, OrderCommand};

use std::collections::HashMap;
use std::time::Duration;

use crate::gateway::{ExecutionGateway, GatewayError};
use crate::ledger::Ledger;
use crate::models::{Direction, Order, Tick};
use crate::notify::Notifier;
use crate::stats::{self, StatsWriter};

/// Why an active order was closed on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    SessionEnd,
    StopLoss,
    TakeProfit,
}

/// Owns the in-memory order book and drives the open → closed lifecycle.
///
/// All mutation happens on the single worker task that owns the engine
/// (see [`worker`]), so no per-order locking is needed. The ledger records
/// creation events only; closures are in-memory mutations.
pub struct OrderEngine<G, N> {
    orders: Vec<Order>,
    guard: DuplicateGuard,
    session: SessionWindow,
    /// Static registry: instrument name -> broker contract id.
    registry: HashMap<String, String>,
    account_id: String,
    gateway: Option<G>,
    gateway_timeout: Duration,
    notifier: Option<N>,
    ledger: Ledger,
    stats: StatsWriter,
}

impl<G: ExecutionGateway, N: Notifier> OrderEngine<G, N> {
    /// Build an engine, loading any existing orders from the ledger.
    pub fn new(
        ledger: Ledger,
        stats: StatsWriter,
        guard: DuplicateGuard,
        session: SessionWindow,
        registry: HashMap<String, String>,
        account_id: String,
    ) -> Self {
        let orders = ledger.load_all();

        Self {
            orders,
            guard,
            session,
            registry,
            account_id,
            gateway: None,
            gateway_timeout: Duration::from_secs(10),
            notifier: None,
            ledger,
            stats,
        }
    }

    /// Attach an execution gateway; without one, orders are tracked only.
    pub fn with_gateway(mut self, gateway: G, timeout: Duration) -> Self {
        self.gateway = Some(gateway);
        self.gateway_timeout = timeout;
        self
    }

    pub fn with_notifier(mut self, notifier: N) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn active_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_active())
    }

    /// Register a candidate order: duplicate-checked, resolved against the
    /// instrument registry, optionally placed with the broker, then appended
    /// to the ledger and announced.
    ///
    /// On gateway failure the order is dropped entirely so the book never
    /// diverges from broker state. A ledger write failure is logged but not
    /// fatal; the in-memory book stays authoritative.
    pub async fn create_order(&mut self, candidate: Option<Order>) -> anyhow::Result<()> {
        let Some(mut order) = candidate else {
            return Ok(());
        };

        if self.guard.is_already_open(&self.orders, &order) {
            tracing::info!(
                "order already open for {} {:?}, skipping",
                order.instrument,
                order.direction
            );
            return Ok(());
        }

        let Some(contract) = self.registry.get(&order.instrument) else {
            anyhow::bail!("unknown instrument: {}", order.instrument);
        };

        if let Some(gateway) = &self.gateway {
            let placed = tokio::time::timeout(
                self.gateway_timeout,
                gateway.place_market_order(&self.account_id, contract, 1, order.direction, order.id),
            )
            .await;

            match placed {
                Ok(Ok(broker_order_id)) => {
                    tracing::info!("broker accepted order {} as {}", order.id, broker_order_id);
                    order.broker_order_id = Some(broker_order_id);
                }
                Ok(Err(e)) => {
                    anyhow::bail!("gateway refused order {}: {}", order.id, e);
                }
                Err(_) => {
                    return Err(anyhow::Error::new(GatewayError::Timeout).context(format!(
                        "order {} not placed within {:?}",
                        order.id, self.gateway_timeout
                    )));
                }
            }
        }

        if let Err(e) = self.ledger.append(&order) {
            tracing::error!("failed to persist order {}: {}", order.id, e);
        }

        let message = format!(
            "✅ {}: open {}, take {}, stop {}",
            order.instrument, order.open, order.take, order.stop
        );
        tracing::info!("{}", message);
        self.orders.push(order);
        self.notify(&message).await;

        Ok(())
    }

    /// Evaluate one price tick against the whole book.
    ///
    /// Precedence per order: session deadline first (sweeps every active
    /// order regardless of instrument), then instrument match, then stop
    /// before take. Closed orders are never re-evaluated.
    pub async fn on_tick(&mut self, tick: &Tick) {
        let in_session = self.session.is_open(tick.time);
        let mut messages = Vec::new();

        for order in self.orders.iter_mut().filter(|o| o.is_active()) {
            let reason = if !in_session {
                CloseReason::SessionEnd
            } else if order.instrument != tick.instrument {
                continue;
            } else {
                let hit_stop = match order.direction {
                    Direction::Long => tick.price < order.stop,
                    Direction::Short => tick.price > order.stop,
                };
                let hit_take = match order.direction {
                    Direction::Long => tick.price > order.take,
                    Direction::Short => tick.price < order.take,
                };

                // Stop before take: conservative tie-break.
                if hit_stop {
                    CloseReason::StopLoss
                } else if hit_take {
                    CloseReason::TakeProfit
                } else {
                    continue;
                }
            };

            order.close_at(tick.price);
            let result = order.result.unwrap_or_default();

            match reason {
                CloseReason::SessionEnd => tracing::info!(
                    "session over, closing order opened at {}: result {}",
                    order.time,
                    result
                ),
                CloseReason::StopLoss => tracing::info!(
                    "stop-loss close, result {}; opened {}, now {}",
                    result,
                    order.time,
                    tick.time
                ),
                CloseReason::TakeProfit => tracing::info!(
                    "take-profit close, result {}; opened {}, now {}",
                    result,
                    order.time,
                    tick.time
                ),
            }

            messages.push(format!(
                "closed position on {}: result {}",
                order.instrument, result
            ));
        }

        for message in messages {
            self.notify(&message).await;
        }
    }

    /// Summarize closed orders per instrument, appending to the stats files
    /// and logging the same figures.
    pub fn write_statistics(&self) {
        let summaries = stats::summarize(&self.orders);
        self.stats.write(&summaries);
    }

    async fn notify(&self, text: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.post(text).await;
        }
    }
}
