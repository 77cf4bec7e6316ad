use chrono::{Datelike, Days, Months, NaiveDate};

use super::ExpenseRecord;

/// A half-open range of calendar days: `start` is included, `end` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The single day `[day, day + 1)`.
    pub fn day(day: NaiveDate) -> Self {
        Self::new(day, next_day(day))
    }

    /// The week containing `day`. Weeks start on Monday.
    pub fn week(day: NaiveDate) -> Self {
        let offset = day.weekday().num_days_from_monday() as u64;
        let start = day.checked_sub_days(Days::new(offset)).unwrap_or(day);
        let end = start
            .checked_add_days(Days::new(7))
            .unwrap_or(NaiveDate::MAX);
        Self::new(start, end)
    }

    /// The calendar month containing `day`.
    pub fn month(day: NaiveDate) -> Self {
        let start = day.with_day(1).unwrap_or(day);
        let end = start
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self::new(start, end)
    }

    /// Smallest window covering every record, or `None` for an empty ledger.
    pub fn lifetime<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> Option<Self> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for record in records {
            bounds = Some(match bounds {
                None => (record.date, record.date),
                Some((min, max)) => (min.min(record.date), max.max(record.date)),
            });
        }
        bounds.map(|(min, max)| Self::new(min, next_day(max)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.succ_opt().unwrap_or(NaiveDate::MAX)
}
