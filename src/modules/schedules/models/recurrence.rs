use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::timezone::{home_date, home_offset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Daily => write!(f, "daily"),
            Cadence::Weekly => write!(f, "weekly"),
            Cadence::Monthly => write!(f, "monthly"),
        }
    }
}

/// When a scheduled report fires: a cadence plus a local (IST) time of day.
///
/// The first run lands on the next anchor time after creation; later runs step by the
/// cadence from there, so a weekly job keeps the weekday it was created on. Monthly jobs
/// keep `day_of_month` and fall back to the last day of shorter months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub cadence: Cadence,
    /// Local time of day, e.g. `"07:30"`
    #[serde(with = "anchor_format")]
    pub anchor_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
}

impl Recurrence {
    pub fn new(cadence: Cadence, anchor_time: NaiveTime) -> Self {
        Self {
            cadence,
            anchor_time,
            day_of_month: None,
        }
    }

    /// Fixes the monthly day to the local date of `run` unless one is already set
    pub fn pinned_to(mut self, run: DateTime<Utc>) -> Self {
        if self.cadence == Cadence::Monthly && self.day_of_month.is_none() {
            self.day_of_month = Some(home_date(run).day());
        }
        self
    }

    /// Same day of month one month on, clamped to that month's last day
    fn next_month(&self, day: NaiveDate) -> Option<NaiveDate> {
        let first = day.with_day(1)?.checked_add_months(Months::new(1))?;
        let last = first.checked_add_months(Months::new(1))?.pred_opt()?.day();
        let wanted = self.day_of_month.unwrap_or(day.day());
        first.with_day(wanted.clamp(1, last))
    }

    fn at_anchor(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = NaiveDateTime::new(date, self.anchor_time);
        home_offset()
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| local.and_utc())
    }

    /// One cadence step after `from`, kept on the anchor time
    pub fn step(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        let day = home_date(from);
        let next = match self.cadence {
            Cadence::Daily => day.checked_add_days(Days::new(1)),
            Cadence::Weekly => day.checked_add_days(Days::new(7)),
            Cadence::Monthly => self.next_month(day),
        };
        self.at_anchor(next.unwrap_or(day + Days::new(28)))
    }

    /// First anchor occurrence strictly after `now`
    pub fn first_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = self.at_anchor(home_date(now));
        if today > now {
            return today;
        }
        self.at_anchor(home_date(now) + Days::new(1))
    }

    /// Next run after a firing that was due at `scheduled`.
    ///
    /// Steps by cadence until the result is strictly after `now`, so a trigger that was
    /// down for a while fires once and does not replay every missed period.
    pub fn next_after(&self, scheduled: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut next = self.step(scheduled);
        while next <= now {
            next = self.step(next);
        }
        next
    }

    /// Inclusive report range for a firing on local date `fire_date`.
    ///
    /// Always ends yesterday: daily covers yesterday, weekly the seven days before,
    /// monthly the month before.
    pub fn window(&self, fire_date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = fire_date.pred_opt().unwrap_or(fire_date);
        let start = match self.cadence {
            Cadence::Daily => end,
            Cadence::Weekly => fire_date - Days::new(7),
            Cadence::Monthly => fire_date
                .checked_sub_months(Months::new(1))
                .unwrap_or(fire_date - Days::new(30)),
        };
        (start, end)
    }
}

/// `HH:MM` on output; `HH:MM` or `HH:MM:SS` on input
mod anchor_format {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(|_| {
                de::Error::custom(format!("invalid anchor time '{}', expected HH:MM", raw))
            })
    }
}
