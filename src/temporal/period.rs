//! Period overlap resolution.
//!
//! A registry record carries a [`RecordSpan`]: a validity interval with
//! possibly missing ends, a single event date, or a calendar-year stamp.
//! [`FollowUp::clip`] intersects that span with an individual's follow-up
//! window and yields a [`ClippedInterval`] that knows how to split itself
//! into calendar years, month weights and day counts.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

use crate::config::Granularity;
use crate::temporal::onset::onset_age;

/// Follow-up window of one individual, with the birth date used for onsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub date_of_birth: NaiveDate,
}

/// Closed date interval with both ends known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Time extent of a registry record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSpan {
    /// Validity interval; a missing end means the record is ongoing
    Dated {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// Single-day event
    Event(NaiveDate),
    /// Whole calendar year statistic
    Year(i32),
}

/// Intersection of a record span with a follow-up window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Date the record counts as having started within the window
    pub onset_anchor: NaiveDate,
}

fn first_day(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn last_day(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
}

impl RecordSpan {
    /// Dated span from optional start and end
    #[must_use]
    pub const fn dated(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self::Dated { start, end }
    }

    /// Concrete interval of a dated span
    ///
    /// An open end extends to `today`. A missing start makes the record
    /// unusable in yearly mode; in aggregate mode it is left unbounded and
    /// the follow-up window supplies the lower bound. Inverted intervals
    /// resolve to nothing.
    #[must_use]
    pub fn resolve(self, granularity: Granularity, today: NaiveDate) -> Option<Interval> {
        let (start, end) = match self {
            Self::Dated { start, end } => {
                let start = match (start, granularity) {
                    (Some(start), _) => start,
                    (None, Granularity::Aggregate) => NaiveDate::MIN,
                    (None, Granularity::Yearly) => return None,
                };
                (start, end.unwrap_or(today))
            }
            Self::Event(date) => (date, date),
            Self::Year(year) => (first_day(year), last_day(year)),
        };
        (start <= end).then_some(Interval { start, end })
    }
}

impl FollowUp {
    /// Years touched by the window, inclusive
    #[must_use]
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start.year()..=self.end.year()
    }

    /// Whether a date lies inside the window
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Onset age of an event date for this individual
    #[must_use]
    pub fn age_at(&self, date: NaiveDate) -> f64 {
        onset_age(self.date_of_birth, date)
    }

    /// Clip a record span to the window
    ///
    /// Returns `None` when the span and the window do not intersect or the
    /// span cannot be resolved for the given granularity.
    #[must_use]
    pub fn clip(
        &self,
        span: RecordSpan,
        granularity: Granularity,
        today: NaiveDate,
    ) -> Option<ClippedInterval> {
        if let RecordSpan::Year(year) = span {
            // year statistics count for every year the window touches
            if !self.years().contains(&year) {
                return None;
            }
            return Some(ClippedInterval {
                start: first_day(year).max(self.start),
                end: last_day(year).min(self.end),
                onset_anchor: first_day(year),
            });
        }

        let interval = span.resolve(granularity, today)?;
        self.clip_interval(interval)
    }

    /// Clip a resolved interval to the window
    #[must_use]
    pub fn clip_interval(&self, interval: Interval) -> Option<ClippedInterval> {
        if interval.start > self.end || interval.end < self.start {
            return None;
        }
        let start = interval.start.max(self.start);
        Some(ClippedInterval {
            start,
            end: interval.end.min(self.end),
            onset_anchor: start,
        })
    }
}

impl ClippedInterval {
    /// Calendar years covered, ascending
    #[must_use]
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start.year()..=self.end.year()
    }

    /// Month weight for monetary pro-ration in `year`
    ///
    /// Interior years weigh 12, the first year `13 - start_month` and the
    /// last year `end_month`. When start and end share a year the last-year
    /// rule is applied after the first-year rule and replaces it.
    #[must_use]
    pub fn months_in_year(&self, year: i32) -> u32 {
        let mut months = 12;
        if year == self.start.year() {
            months = 13 - self.start.month();
        }
        if year == self.end.year() {
            months = self.end.month();
        }
        months
    }

    /// Inclusive day count of the interval
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Inclusive day count of the part of the interval inside `year`
    #[must_use]
    pub fn days_in_year(&self, year: i32) -> i64 {
        let start = self.start.max(first_day(year));
        let end = self.end.min(last_day(year));
        if start > end {
            0
        } else {
            (end - start).num_days() + 1
        }
    }

    /// Onset date of the record within `year`
    ///
    /// The anchor in the first year, January 1 in later years.
    #[must_use]
    pub fn onset_in_year(&self, year: i32) -> NaiveDate {
        if year == self.start.year() {
            self.onset_anchor
        } else {
            first_day(year)
        }
    }
}
