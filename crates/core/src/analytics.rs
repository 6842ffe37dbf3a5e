//! Sales chart bucketing.
//!
//! Every function here partitions its input: each sample lands in exactly
//! one bucket, so bucket sums always add up to the input sum.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One dated amount, typically a receipt total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub at: DateTime<Utc>,
    pub amount: Decimal,
}

impl Sample {
    #[must_use]
    pub const fn new(at: DateTime<Utc>, amount: Decimal) -> Self {
        Self { at, amount }
    }
}

/// Totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    /// Short label for chart axes, e.g. `19 Oct`.
    pub label: String,
    pub amount: Decimal,
    pub count: u64,
}

impl DayBucket {
    fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            label: day_label(day),
            amount: Decimal::ZERO,
            count: 0,
        }
    }

    fn add(&mut self, amount: Decimal) {
        self.amount += amount;
        self.count += 1;
    }
}

/// Totals for one hour of the day (0-23), across all days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourBucket {
    pub hour: u32,
    pub amount: Decimal,
    pub count: u64,
}

/// Chart axis label for a day.
#[must_use]
pub fn day_label(day: NaiveDate) -> String {
    day.format("%d %b").to_string()
}

/// Group samples by calendar day (UTC), ascending.
///
/// Days without samples are omitted; use [`daily_series`] for a gap-free
/// window.
#[must_use]
pub fn bucket_by_day(samples: &[Sample]) -> Vec<DayBucket> {
    let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for sample in samples {
        let day = sample.at.date_naive();
        days.entry(day)
            .or_insert_with(|| DayBucket::empty(day))
            .add(sample.amount);
    }
    days.into_values().collect()
}

/// Group samples by hour of day. Always returns 24 buckets.
#[must_use]
pub fn bucket_by_hour(samples: &[Sample]) -> Vec<HourBucket> {
    let mut hours: Vec<HourBucket> = (0..24)
        .map(|hour| HourBucket {
            hour,
            amount: Decimal::ZERO,
            count: 0,
        })
        .collect();
    for sample in samples {
        let hour = sample.at.hour() as usize;
        if let Some(bucket) = hours.get_mut(hour) {
            bucket.amount += sample.amount;
            bucket.count += 1;
        }
    }
    hours
}

/// A zero-filled series of `days` consecutive days ending at `end_day`.
///
/// Samples outside the window are ignored.
#[must_use]
pub fn daily_series(samples: &[Sample], end_day: NaiveDate, days: u32) -> Vec<DayBucket> {
    let Some(start_day) = days
        .checked_sub(1)
        .and_then(|back| end_day.checked_sub_days(Days::new(u64::from(back))))
    else {
        return Vec::new();
    };

    let mut series: Vec<DayBucket> = start_day
        .iter_days()
        .take(days as usize)
        .map(DayBucket::empty)
        .collect();

    for sample in samples {
        let day = sample.at.date_naive();
        if day < start_day || day > end_day {
            continue;
        }
        let offset = (day - start_day).num_days();
        if let Some(bucket) = usize::try_from(offset).ok().and_then(|i| series.get_mut(i)) {
            bucket.add(sample.amount);
        }
    }
    series
}

/// Headline numbers for an owner's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub receipt_count: u64,
    pub unique_customers: u64,
}

impl SalesSummary {
    /// Summarize `(customer_name, total)` pairs.
    ///
    /// Customers are counted by trimmed, case-folded name.
    pub fn from_receipts<'a, I>(receipts: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        let mut summary = Self::default();
        let mut customers = HashSet::new();
        for (customer, total) in receipts {
            summary.total_sales += total;
            summary.receipt_count += 1;
            customers.insert(customer.trim().to_lowercase());
        }
        summary.unique_customers = customers.len() as u64;
        summary
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, amount: i64) -> Sample {
        Sample::new(
            Utc.with_ymd_and_hms(y, m, d, h, 15, 0).unwrap(),
            Decimal::from(amount),
        )
    }

    fn samples() -> Vec<Sample> {
        vec![
            at(2026, 10, 17, 9, 1500),
            at(2026, 10, 17, 21, 250),
            at(2026, 10, 19, 9, 4000),
            at(2026, 10, 12, 23, 700),
            at(2026, 10, 19, 0, -100),
        ]
    }

    fn raw_sum(samples: &[Sample]) -> Decimal {
        samples.iter().map(|s| s.amount).sum()
    }

    #[test]
    fn test_bucket_by_day_is_a_partition() {
        let input = samples();
        let buckets = bucket_by_day(&input);
        let sum: Decimal = buckets.iter().map(|b| b.amount).sum();
        let count: u64 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(sum, raw_sum(&input));
        assert_eq!(count, input.len() as u64);
        assert_eq!(buckets.len(), 3);
    }

    #[test]
    fn test_bucket_by_day_sorted_with_labels() {
        let buckets = bucket_by_day(&samples());
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["12 Oct", "17 Oct", "19 Oct"]);
        assert_eq!(buckets[1].amount, Decimal::from(1750));
    }

    #[test]
    fn test_bucket_by_hour_is_a_partition() {
        let input = samples();
        let buckets = bucket_by_hour(&input);
        assert_eq!(buckets.len(), 24);
        let sum: Decimal = buckets.iter().map(|b| b.amount).sum();
        assert_eq!(sum, raw_sum(&input));
        assert_eq!(buckets[9].count, 2);
        assert_eq!(buckets[9].amount, Decimal::from(5500));
    }

    #[test]
    fn test_bucket_by_hour_empty_input() {
        let buckets = bucket_by_hour(&[]);
        assert_eq!(buckets.len(), 24);
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_daily_series_zero_fills_and_windows() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let series = daily_series(&samples(), end, 7);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].label, "13 Oct");
        assert_eq!(series[6].label, "19 Oct");
        // 12 Oct falls outside the window
        let sum: Decimal = series.iter().map(|b| b.amount).sum();
        assert_eq!(sum, Decimal::from(5650));
        assert_eq!(series[5].count, 0);
    }

    #[test]
    fn test_daily_series_zero_days() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(daily_series(&samples(), end, 0).is_empty());
    }

    #[test]
    fn test_sales_summary() {
        let receipts = [
            ("Bola", Decimal::from(2100)),
            ("bola ", Decimal::from(900)),
            ("Guest Customer", Decimal::from(50)),
        ];
        let summary = SalesSummary::from_receipts(receipts.iter().map(|(c, t)| (*c, *t)));
        assert_eq!(summary.total_sales, Decimal::from(3050));
        assert_eq!(summary.receipt_count, 3);
        assert_eq!(summary.unique_customers, 2);
    }
}
