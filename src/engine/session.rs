use chrono::{DateTime, NaiveTime, Utc};

/// Daily trading-session window in UTC.
///
/// Outside the window every remaining active order is swept closed at the
/// current price, so the book never carries positions across a session
/// boundary.
#[derive(Debug, Clone, Copy)]
pub struct SessionWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(20, 45, 0).unwrap(),
        }
    }
}

impl SessionWindow {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    pub fn is_open(&self, time: DateTime<Utc>) -> bool {
        let t = time.time();
        t >= self.open && t < self.close
    }
}
