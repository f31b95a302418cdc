//! Collapses per-unit aggregate counts into at most `max_links` choices.
//!
//! When there are more rows than links, the unit axis is split into
//! even-sized buckets. Month and day axes are fixed (`1..=12`, `1..=31`) so a
//! bucket never wraps into the next year or month; the year axis spans the
//! years present. Bucket ends are plain unit arithmetic and are not clamped
//! to real month lengths.

use crate::domain::values::date_choice::DateChoice;
use crate::domain::values::date_range_type::{DateLevel, DateRangeType};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Turns `(date, count)` rows at `range_type`'s granularity into
/// `(choice, count)` pairs.
///
/// Rows are expected in ascending date order, one per distinct unit. With
/// `results.len() <= max_links` the output is a one-to-one relabeling in the
/// same order; otherwise it is a list of range choices, empty buckets
/// dropped, whose counts sum to the input total.
pub fn collapse_results(
    results: &[(NaiveDate, u64)],
    range_type: DateRangeType,
    max_links: usize,
) -> Vec<(DateChoice, u64)> {
    let max_links = max_links.max(1);
    if results.len() <= max_links {
        return results
            .iter()
            .map(|(date, count)| (DateChoice::from_date(range_type, *date), *count))
            .collect();
    }

    let level = range_type.level();
    let (first, last) = match level {
        DateLevel::Month => (1, 12),
        DateLevel::Day => (1, 31),
        DateLevel::Year => {
            let years = results.iter().map(|(d, _)| level.unit_value(*d));
            let first = years.clone().min().unwrap_or_default();
            let last = years.max().unwrap_or_default();
            (first, last)
        }
    };

    let span = (last - first + 1).max(1) as usize;
    let bucket_size = span.div_ceil(max_links);
    let num_buckets = span.div_ceil(bucket_size);
    debug!(
        level = %level,
        rows = results.len(),
        max_links,
        bucket_size,
        num_buckets,
        "collapsing date counts into buckets"
    );

    // (template date, summed count) per bucket
    let mut buckets: Vec<Option<(NaiveDate, u64)>> = vec![None; num_buckets];
    for (date, count) in results {
        let offset = (level.unit_value(*date) - first).max(0) as usize;
        let index = (offset / bucket_size).min(num_buckets - 1);
        let bucket = buckets[index].get_or_insert((*date, 0));
        bucket.1 += *count;
    }

    let mut out = Vec::with_capacity(num_buckets);
    for (i, bucket) in buckets.into_iter().enumerate() {
        let Some((template, count)) = bucket else {
            continue;
        };
        let start_unit = first + (bucket_size * i) as i32;
        let bounds = level.with_unit_value(template, start_unit).and_then(|start| {
            level
                .add_units(start, (bucket_size - 1) as u32)
                .map(|end| (start, end))
        });
        match bounds {
            Some((start, end)) => {
                out.push((DateChoice::from_date_range(range_type, start, end), count))
            }
            None => warn!(
                level = %level,
                start_unit,
                %template,
                "bucket boundary outside the calendar, dropping bucket"
            ),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params(out: &[(DateChoice, u64)]) -> Vec<(String, u64)> {
        out.iter().map(|(c, n)| (c.to_param(), *n)).collect()
    }

    fn expected(rows: &[(&str, u64)]) -> Vec<(String, u64)> {
        rows.iter().map(|(p, n)| (p.to_string(), *n)).collect()
    }

    #[test]
    fn test_no_collapse_is_identity() {
        let results = vec![(ymd(2020, 3, 1), 5), (ymd(2021, 7, 1), 3), (ymd(2022, 1, 1), 2)];
        let out = collapse_results(&results, DateRangeType::Year, 10);
        assert_eq!(
            params(&out),
            expected(&[("2020", 5), ("2021", 3), ("2022", 2)])
        );
        assert!(out.iter().all(|(c, _)| c.range_type() == DateRangeType::Year));
    }

    #[test]
    fn test_fifty_years_into_ten_buckets() {
        let results: Vec<_> = (1900..1950).map(|y| (ymd(y, 1, 1), 1)).collect();
        let out = collapse_results(&results, DateRangeType::Year, 10);
        assert_eq!(out.len(), 10);
        assert_eq!(out.iter().map(|(_, n)| n).sum::<u64>(), 50);
        assert_eq!(out[0].0.to_param(), "1900..1904");
        assert_eq!(out[9].0.to_param(), "1945..1949");
        for (choice, count) in &out {
            assert_eq!(choice.range_type(), DateRangeType::YearGroup);
            assert_eq!(*count, 5);
        }
    }

    #[test]
    fn test_sparse_years_drop_empty_buckets() {
        let results = vec![
            (ymd(1813, 1, 1), 2),
            (ymd(1814, 1, 1), 1),
            (ymd(1847, 1, 1), 3),
            (ymd(1848, 1, 1), 1),
            (ymd(1870, 1, 1), 4),
        ];
        let out = collapse_results(&results, DateRangeType::Year, 4);
        assert!(out.len() <= 4);
        assert_eq!(out.iter().map(|(_, n)| n).sum::<u64>(), 11);
        // span 58, bucket size 15
        assert_eq!(
            params(&out),
            expected(&[
                ("1813..1827", 3),
                ("1843..1857", 4),
                ("1858..1872", 4),
            ])
        );
    }

    #[test]
    fn test_months_use_fixed_axis() {
        let results: Vec<_> = (1..=12).map(|m| (ymd(1813, m, 1), u64::from(m))).collect();
        let out = collapse_results(&results, DateRangeType::Month, 4);
        assert_eq!(
            params(&out),
            expected(&[
                ("1813-01..1813-03", 6),
                ("1813-04..1813-06", 15),
                ("1813-07..1813-09", 24),
                ("1813-10..1813-12", 33),
            ])
        );
        assert_eq!(out[0].0.display(), "January-March");
    }

    #[test]
    fn test_days_use_fixed_axis() {
        let results: Vec<_> = [2, 3, 9, 17, 28].iter().map(|d| (ymd(1813, 2, *d), 1)).collect();
        let out = collapse_results(&results, DateRangeType::Day, 3);
        // span 31, bucket size 11: 1-11, 12-22, 23-33
        assert_eq!(
            params(&out),
            expected(&[
                ("1813-02-01..1813-02-11", 3),
                ("1813-02-12..1813-02-22", 1),
                ("1813-02-23..1813-03-05", 1),
            ])
        );
    }

    #[test]
    fn test_bucket_count_and_sum_bounds() {
        for max_links in 1..=15 {
            for n in 1..=40i32 {
                let results: Vec<_> = (0..n).map(|i| (ymd(1800 + i * 3, 1, 1), (i as u64 % 4) + 1)).collect();
                let total: u64 = results.iter().map(|(_, c)| c).sum();
                let out = collapse_results(&results, DateRangeType::Year, max_links);
                assert!(out.len() <= max_links);
                assert_eq!(out.iter().map(|(_, c)| c).sum::<u64>(), total);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(collapse_results(&[], DateRangeType::Year, 12).is_empty());
    }
}
