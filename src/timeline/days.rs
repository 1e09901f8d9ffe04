use chrono::NaiveDate;

use crate::calendar::date_math::{date_range, day_count};

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalTimeline {
    days: Vec<NaiveDate>,
    anchor_index: usize,
}

impl LogicalTimeline {
    pub fn new(anchor: NaiveDate, days_before: u32, days_after: u32) -> Self {
        let days = date_range(anchor, days_before, days_after);
        let anchor_index = days.iter().position(|d| *d == anchor).unwrap_or(0);
        Self { days, anchor_index }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn anchor_index(&self) -> usize {
        self.anchor_index
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.days.get(index).copied()
    }

    /// Signed day offset of `date` from the first day. Dates outside the
    /// timeline yield negative values or values past `len() - 1`.
    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        match self.first_date() {
            Some(first) => day_count(first, date),
            None => 0,
        }
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = self.offset_of(date);
        if offset >= 0 && (offset as usize) < self.days.len() {
            Some(offset as usize)
        } else {
            None
        }
    }
}
