use std::fs::OpenOptions;
use std::path::PathBuf;

use crate::models::Order;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger serialization error: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only CSV record of created orders.
///
/// One row per created order, header written once when the file is first
/// used. There are no updates or deletes; closing an order is an in-memory
/// mutation and never touches the file.
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the full ledger at startup.
    ///
    /// A missing or unreadable file yields an empty set; a malformed row is
    /// skipped with a warning so one bad record cannot poison the load.
    pub fn load_all(&self) -> Vec<Order> {
        if !self.path.exists() {
            tracing::info!("no ledger at {}, starting empty", self.path.display());
            return Vec::new();
        }

        let mut reader = match csv::Reader::from_path(&self.path) {
            Ok(reader) => reader,
            Err(e) => {
                tracing::error!("failed to open ledger {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        let mut orders = Vec::new();
        for record in reader.deserialize::<Order>() {
            match record {
                Ok(order) => orders.push(order),
                // An io error will not clear on the next read; stop with
                // whatever was loaded so far.
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    tracing::error!("ledger {} unreadable: {}", self.path.display(), e);
                    break;
                }
                Err(e) => {
                    tracing::warn!("skipping malformed ledger row: {}", e);
                }
            }
        }

        tracing::info!("loaded {} orders from {}", orders.len(), self.path.display());
        orders
    }

    /// Append one order as a new row, flushed before returning.
    pub fn append(&self, order: &Order) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let write_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer.serialize(order)?;
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, OrderStatus};
    use chrono::Utc;
    use std::io::Write;

    fn test_order(instrument: &str, direction: Direction) -> Order {
        Order::new(instrument, direction, 100.0, 95.0, 110.0, Utc::now())
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("orders.csv"));

        assert!(ledger.load_all().is_empty());
    }

    #[test]
    fn test_unreadable_ledger_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the ledger path opens but cannot be read.
        let path = dir.path().join("orders.csv");
        std::fs::create_dir(&path).unwrap();
        let ledger = Ledger::new(&path);

        assert!(ledger.load_all().is_empty());
    }

    #[test]
    fn test_append_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("orders.csv"));

        let order = test_order("GAZP", Direction::Short);
        ledger.append(&order).unwrap();

        let loaded = ledger.load_all();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, order.id);
        assert_eq!(loaded[0].instrument, "GAZP");
        assert_eq!(loaded[0].direction, Direction::Short);
        assert_eq!(loaded[0].open, 100.0);
        assert_eq!(loaded[0].stop, 95.0);
        assert_eq!(loaded[0].take, 110.0);
        assert_eq!(loaded[0].time, order.time);
        assert_eq!(loaded[0].status, OrderStatus::Active);
        assert!(loaded[0].close.is_none());
        assert!(loaded[0].result.is_none());
        assert!(loaded[0].is_win.is_none());
    }

    #[test]
    fn test_header_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        let ledger = Ledger::new(&path);

        ledger.append(&test_order("GAZP", Direction::Long)).unwrap();
        ledger.append(&test_order("SBER", Direction::Long)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header_lines = contents
            .lines()
            .filter(|line| line.starts_with("id,"))
            .count();
        assert_eq!(header_lines, 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        let ledger = Ledger::new(&path);

        ledger.append(&test_order("GAZP", Direction::Long)).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not,a,valid,order,row").unwrap();

        ledger.append(&test_order("SBER", Direction::Short)).unwrap();

        let loaded = ledger.load_all();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].instrument, "GAZP");
        assert_eq!(loaded[1].instrument, "SBER");
    }

    #[test]
    fn test_unknown_direction_code_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        let ledger = Ledger::new(&path);

        ledger.append(&test_order("GAZP", Direction::Long)).unwrap();

        // Corrupt the direction column of a copied row.
        let contents = std::fs::read_to_string(&path).unwrap();
        let good_row = contents.lines().nth(1).unwrap();
        let bad_row = good_row.replacen(",1,", ",9,", 1);
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{}", bad_row).unwrap();

        let loaded = ledger.load_all();
        assert_eq!(loaded.len(), 1);
    }
}
