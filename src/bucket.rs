//! Daily bucketing
//!
//! Groups log entries by the calendar date they were logged on.

use crate::types::{Category, HealthLogEntry};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Entries logged on one calendar date
#[derive(Debug, Clone)]
pub struct DailyBucket<'a> {
    pub date: NaiveDate,
    pub entries: Vec<&'a HealthLogEntry>,
}

impl<'a> DailyBucket<'a> {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one category, in input order
    pub fn of(&self, category: Category) -> impl Iterator<Item = &'a HealthLogEntry> + '_ {
        self.entries
            .iter()
            .copied()
            .filter(move |e| e.category == category)
    }
}

/// Index of entries by calendar date
#[derive(Debug, Clone, Default)]
pub struct DayIndex<'a> {
    days: BTreeMap<NaiveDate, DailyBucket<'a>>,
}

impl<'a> DayIndex<'a> {
    /// Bucket every entry by its date
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a HealthLogEntry>,
    {
        let mut days: BTreeMap<NaiveDate, DailyBucket<'a>> = BTreeMap::new();
        for entry in entries {
            let date = entry.date();
            days.entry(date)
                .or_insert_with(|| DailyBucket::new(date))
                .entries
                .push(entry);
        }
        Self { days }
    }

    /// Bucket for a date; empty when nothing was logged that day
    pub fn bucket(&self, date: NaiveDate) -> DailyBucket<'a> {
        self.days
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DailyBucket::new(date))
    }

    /// Number of dates with at least one entry
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
