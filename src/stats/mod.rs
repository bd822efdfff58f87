use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::models::Order;

/// Outcome figures for one instrument's closed orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstrumentSummary {
    pub count: usize,
    pub wins: usize,
    pub win_points: f64,
    pub losses: usize,
    /// Sum of losing results; losses carry negative results, so this is <= 0.
    pub loss_points: f64,
    pub net: f64,
}

/// Group closed orders by instrument and total up their outcomes.
///
/// Grouping is hash-based over the full set, so interleaved instruments in
/// the ledger are handled correctly. Active orders are ignored. Pure
/// function of the order set.
pub fn summarize(orders: &[Order]) -> HashMap<String, InstrumentSummary> {
    let mut summaries: HashMap<String, InstrumentSummary> = HashMap::new();

    for order in orders {
        let (Some(result), Some(is_win)) = (order.result, order.is_win) else {
            continue;
        };

        let summary = summaries.entry(order.instrument.clone()).or_default();
        summary.count += 1;
        if is_win {
            summary.wins += 1;
            summary.win_points += result;
        } else {
            summary.losses += 1;
            summary.loss_points += result;
        }
        summary.net = summary.win_points + summary.loss_points;
    }

    summaries
}

/// Appends one human-readable block per instrument per run.
///
/// Append-only by contract: repeated runs append repeated blocks, rotation
/// is the caller's concern.
pub struct StatsWriter {
    dir: PathBuf,
}

impl StatsWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, summaries: &HashMap<String, InstrumentSummary>) {
        let mut instruments: Vec<&String> = summaries.keys().collect();
        instruments.sort();

        for instrument in instruments {
            let summary = &summaries[instrument];

            tracing::info!("instrument: {}", instrument);
            tracing::info!("trades: {}", summary.count);
            tracing::info!("winning trades: {}", summary.wins);
            tracing::info!("points earned: {}", summary.win_points);
            tracing::info!("losing trades: {}", summary.losses);
            tracing::info!("points lost: {}", summary.loss_points);
            tracing::info!("net points: {}", summary.net);
            tracing::info!("-------------------------------------");

            if let Err(e) = self.append_block(instrument, summary) {
                tracing::error!("failed to write statistics for {}: {}", instrument, e);
            }
        }
    }

    fn append_block(&self, instrument: &str, summary: &InstrumentSummary) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("statistics-{}.log", instrument));
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        writeln!(file, "trades: {}", summary.count)?;
        writeln!(file, "winning trades: {}", summary.wins)?;
        writeln!(file, "points earned: {}", summary.win_points)?;
        writeln!(file, "losing trades: {}", summary.losses)?;
        writeln!(file, "points lost: {}", summary.loss_points)?;
        writeln!(file, "net points: {}", summary.net)?;
        writeln!(file, "-------------------------------------")?;

        Ok(())
    }
}
