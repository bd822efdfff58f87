use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trade direction with the broker's integer encoding (1 = buy, 2 = sell).
///
/// The ledger stores the raw integer; unknown values are rejected at parse
/// time instead of being carried through as untyped data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Direction {
    Long = 1,
    Short = 2,
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Long),
            2 => Ok(Direction::Short),
            other => Err(format!("unknown direction code: {}", other)),
        }
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> u8 {
        direction as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Closed,
}

/// A tracked order derived from an external signal.
///
/// `close`, `result` and `is_win` are present only once the order is
/// closed; Closed is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub instrument: String,
    pub direction: Direction,
    pub open: f64,
    pub stop: f64, // adverse threshold, closes as loss
    pub take: f64, // favorable threshold, closes as win
    pub time: DateTime<Utc>,
    pub status: OrderStatus,
    pub close: Option<f64>,
    pub result: Option<f64>,
    pub is_win: Option<bool>,
    pub broker_order_id: Option<String>,
}

impl Order {
    /// Create a new active order.
    pub fn new(
        instrument: impl Into<String>,
        direction: Direction,
        open: f64,
        stop: f64,
        take: f64,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument: instrument.into(),
            direction,
            open,
            stop,
            take,
            time,
            status: OrderStatus::Active,
            close: None,
            result: None,
            is_win: None,
            broker_order_id: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Close the order at `price`, computing the direction-adjusted result.
    ///
    /// Long profits as price rises, short as it falls.
    pub fn close_at(&mut self, price: f64) {
        let result = match self.direction {
            Direction::Long => price - self.open,
            Direction::Short => self.open - price,
        };

        self.status = OrderStatus::Closed;
        self.close = Some(price);
        self.result = Some(result);
        self.is_win = Some(result > 0.0);
    }
}

/// A price event: instrument, price and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    pub instrument: String,
    pub price: f64,
    pub time: DateTime<Utc>,
}
