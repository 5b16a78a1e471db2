//! Monthly sample dates.
//!
//! `MonthlyDates` is a cheap, copyable description of the sample index; every
//! call to `iter()` starts again from January of the first year.

use std::iter::FusedIterator;

use crate::domain::{SampleDate, YearRange};

/// First-of-month dates from January of `range.start` through December of `range.end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyDates {
    range: YearRange,
}

impl MonthlyDates {
    pub fn new(range: YearRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn len(&self) -> usize {
        self.iter().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> MonthIter {
        if self.range.is_empty() {
            return MonthIter::empty();
        }
        // Both ends must be representable dates.
        if SampleDate::new(self.range.end, 12).is_none() {
            return MonthIter::empty();
        }
        match SampleDate::new(self.range.start, 1) {
            Some(first) => MonthIter {
                next: Some(first),
                remaining: self.range.month_count(),
            },
            None => MonthIter::empty(),
        }
    }
}

impl IntoIterator for &MonthlyDates {
    type Item = SampleDate;
    type IntoIter = MonthIter;

    fn into_iter(self) -> MonthIter {
        self.iter()
    }
}

/// Iterator over `MonthlyDates`.
#[derive(Debug, Clone)]
pub struct MonthIter {
    next: Option<SampleDate>,
    remaining: usize,
}

impl MonthIter {
    fn empty() -> Self {
        Self {
            next: None,
            remaining: 0,
        }
    }
}

impl Iterator for MonthIter {
    type Item = SampleDate;

    fn next(&mut self) -> Option<SampleDate> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = if self.remaining > 0 {
            current.next_month()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for MonthIter {}

impl FusedIterator for MonthIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(start: i32, end: i32) -> Vec<SampleDate> {
        MonthlyDates::new(YearRange::new(start, end)).iter().collect()
    }

    #[test]
    fn single_year_yields_twelve_first_of_month_dates() {
        let out = dates(2020, 2020);
        assert_eq!(out.len(), 12);
        assert_eq!(out.first().map(|d| d.to_string()).as_deref(), Some("2020-01-01"));
        assert_eq!(out.last().map(|d| d.to_string()).as_deref(), Some("2020-12-01"));
        for (i, d) in out.iter().enumerate() {
            assert_eq!(d.year(), 2020);
            assert_eq!(d.month(), i as u32 + 1);
            assert_eq!(d.date().format("%d").to_string(), "01");
        }
    }

    #[test]
    fn count_matches_twelve_per_year_and_is_strictly_increasing() {
        for (start, end) in [(1981, 2025), (1999, 2001), (2024, 2025)] {
            let out = dates(start, end);
            assert_eq!(out.len(), 12 * (end - start + 1) as usize);
            assert!(out.windows(2).all(|w| w[0] < w[1]));
            assert!(out.windows(2).all(|w| w[0].next_month() == Some(w[1])));
        }
    }

    #[test]
    fn reversed_range_is_empty() {
        assert!(dates(2021, 2020).is_empty());
        assert!(MonthlyDates::new(YearRange::new(2021, 2020)).is_empty());
    }

    #[test]
    fn iteration_is_restartable() {
        let seq = MonthlyDates::new(YearRange::new(2000, 2001));
        let first: Vec<_> = seq.iter().collect();
        let second: Vec<_> = (&seq).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(seq.len(), 24);
    }

    #[test]
    fn size_hint_tracks_remaining() {
        let mut it = MonthlyDates::new(YearRange::new(2020, 2020)).iter();
        assert_eq!(it.len(), 12);
        it.next();
        it.next();
        assert_eq!(it.len(), 10);
        assert_eq!(it.by_ref().count(), 10);
        assert_eq!(it.next(), None);
    }
}
