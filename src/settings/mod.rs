use std::path::Path;
use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::engine::{DuplicateGuard, SessionWindow};

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSettings {
    pub base_url: String,
    pub token: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

/// One row of the static instrument registry: signal-side name to
/// broker-side contract id.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentEntry {
    pub name: String,
    pub contract: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// "HH:MM", UTC.
    pub open: String,
    pub close: String,
}

/// Explicit configuration passed to components at construction; nothing
/// here is ambient or global. Layered: defaults, then an optional TOML
/// file, then `ORDERBOT_*` environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub ledger_path: String,
    pub stats_dir: String,
    pub account_id: String,
    pub broker: BrokerSettings,
    #[serde(default)]
    pub telegram: Option<TelegramSettings>,
    #[serde(default)]
    pub instruments: Vec<InstrumentEntry>,
    pub session: SessionSettings,
    #[serde(default)]
    pub duplicate_window_minutes: Option<i64>,
    /// Place orders with the broker sandbox, not just track them.
    pub open_orders: bool,
    /// Post open/close events to Telegram.
    pub notify: bool,
    /// How often the statistics pass runs, in minutes.
    pub stats_interval_minutes: u64,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("ledger_path", "data/orders.csv")?
            .set_default("stats_dir", "logs")?
            .set_default("account_id", "")?
            .set_default("broker.base_url", "https://sandbox.broker.invalid")?
            .set_default("broker.token", "")?
            .set_default("broker.timeout_secs", 10)?
            .set_default("session.open", "07:00")?
            .set_default("session.close", "20:45")?
            .set_default("open_orders", false)?
            .set_default("notify", false)?
            .set_default("stats_interval_minutes", 60)?;

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name("orderbot").required(false)),
        };

        let settings = builder
            .add_source(config::Environment::with_prefix("ORDERBOT").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Resolve an instrument name to its tradable contract id.
    pub fn contract_for(&self, name: &str) -> Option<&str> {
        self.instruments
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.contract.as_str())
    }

    pub fn registry(&self) -> std::collections::HashMap<String, String> {
        self.instruments
            .iter()
            .map(|entry| (entry.name.clone(), entry.contract.clone()))
            .collect()
    }

    pub fn session_window(&self) -> anyhow::Result<SessionWindow> {
        let open = NaiveTime::parse_from_str(&self.session.open, "%H:%M")?;
        let close = NaiveTime::parse_from_str(&self.session.close, "%H:%M")?;
        Ok(SessionWindow::new(open, close))
    }

    pub fn duplicate_guard(&self) -> DuplicateGuard {
        DuplicateGuard::new(self.duplicate_window_minutes.map(chrono::Duration::minutes))
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.broker.timeout_secs)
    }
}
