//! Injected notion of "today".
//!
//! The engine takes `today` as a parameter; only the outer layers decide
//! where it comes from.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

/// Source of the current date and time in a reference offset.
pub trait Clock: Send + Sync {
    /// Current instant in the reference offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current calendar date in the reference offset.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock read in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Clock pinned to a single date, at noon in its offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    /// Pin an exact instant, e.g. one reading of a [`SystemClock`].
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self::on_with_offset(date, utc_offset())
    }

    pub fn on_with_offset(date: NaiveDate, offset: FixedOffset) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        let now = offset
            .from_local_datetime(&noon)
            .single()
            .unwrap_or_else(|| offset.from_utc_datetime(&noon));
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
