use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar unit the timeline axis is divided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Day => "Days",
            Granularity::Week => "Weeks",
            Granularity::Month => "Months",
            Granularity::Quarter => "Quarters",
            Granularity::Year => "Years",
        }
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Day
    }
}

/// One labeled column of the axis. `key` is the canonical first day of the
/// bucket and the exact-match lookup key used by the bar mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisBucket {
    pub key: NaiveDate,
    pub label: String,
}

/// A run-length-encoded grouping label drawn above the bucket row
/// (year headers for month/quarter/year granularities).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpan {
    pub label: String,
    /// Number of consecutive buckets the header covers.
    pub span: usize,
}

/// The computed timeline axis: ordered buckets plus optional grouping
/// headers. Rebuilt from scratch on every date-range or granularity change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeAxis {
    pub granularity: Granularity,
    pub buckets: Vec<AxisBucket>,
    pub headers: Vec<HeaderSpan>,
}

const QUARTER_LABELS: [&str; 4] = ["(Jan-Mar)", "(Apr-Jun)", "(Jul-Sep)", "(Oct-Dec)"];

impl TimeAxis {
    /// Build the axis covering `[min, max]` at the given granularity.
    ///
    /// Total over its inputs: a reversed range yields an empty axis, an
    /// equal range yields at least one bucket, and no input panics. For
    /// month and quarter granularities the axis covers whole calendar
    /// years, so the first bucket can start before `min` and the last can
    /// run past `max`.
    pub fn build(min: NaiveDate, max: NaiveDate, granularity: Granularity) -> TimeAxis {
        let mut axis = TimeAxis {
            granularity,
            buckets: Vec::new(),
            headers: Vec::new(),
        };
        if min > max {
            return axis;
        }

        match granularity {
            Granularity::Day => {
                let mut date = min;
                while date <= max {
                    axis.buckets.push(AxisBucket {
                        key: date,
                        label: date.format("%d %b").to_string(),
                    });
                    date += chrono::Duration::days(1);
                }
            }
            Granularity::Week => {
                // 7-day strides anchored at the range start; the last bucket
                // may overrun `max` by up to 6 days.
                let mut date = min;
                while date <= max {
                    let week_end = date + chrono::Duration::days(6);
                    axis.buckets.push(AxisBucket {
                        key: date,
                        label: format!(
                            "{} - {}",
                            date.format("%d %b"),
                            week_end.format("%d %b")
                        ),
                    });
                    date = week_end + chrono::Duration::days(1);
                }
            }
            Granularity::Month => {
                for year in min.year()..=max.year() {
                    for month in 1..=12u32 {
                        if let Some(key) = NaiveDate::from_ymd_opt(year, month, 1) {
                            axis.buckets.push(AxisBucket {
                                key,
                                label: key.format("%b").to_string(),
                            });
                        }
                    }
                    axis.headers.push(HeaderSpan {
                        label: year.to_string(),
                        span: 12,
                    });
                }
            }
            Granularity::Quarter => {
                for year in min.year()..=max.year() {
                    for quarter in 0..4u32 {
                        if let Some(key) = NaiveDate::from_ymd_opt(year, quarter * 3 + 1, 1) {
                            axis.buckets.push(AxisBucket {
                                key,
                                label: QUARTER_LABELS[quarter as usize].to_string(),
                            });
                        }
                    }
                    axis.headers.push(HeaderSpan {
                        label: year.to_string(),
                        span: 4,
                    });
                }
            }
            Granularity::Year => {
                for year in min.year()..=max.year() {
                    if let Some(key) = NaiveDate::from_ymd_opt(year, 1, 1) {
                        axis.buckets.push(AxisBucket {
                            key,
                            label: year.to_string(),
                        });
                    }
                }
                axis.headers.push(HeaderSpan {
                    label: format!("{} - {}", min.year(), max.year()),
                    span: axis.buckets.len(),
                });
            }
        }

        axis
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Index of the bucket whose key equals `date` exactly. Dates that fall
    /// inside a bucket but not on its key are deliberately not matched; the
    /// bar mapper treats them as "not positioned".
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.buckets.iter().position(|b| b.key == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(Granularity::Day)]
    #[case(Granularity::Week)]
    #[case(Granularity::Month)]
    #[case(Granularity::Quarter)]
    #[case(Granularity::Year)]
    fn reversed_range_yields_empty_axis(#[case] granularity: Granularity) {
        let axis = TimeAxis::build(date(2024, 11, 10), date(2024, 11, 1), granularity);
        assert!(axis.is_empty());
        assert!(axis.headers.is_empty());
    }

    #[rstest]
    #[case(Granularity::Day)]
    #[case(Granularity::Week)]
    #[case(Granularity::Month)]
    #[case(Granularity::Quarter)]
    #[case(Granularity::Year)]
    fn single_day_range_yields_at_least_one_bucket(#[case] granularity: Granularity) {
        let axis = TimeAxis::build(date(2024, 11, 5), date(2024, 11, 5), granularity);
        assert!(!axis.is_empty());
    }

    #[rstest]
    #[case(Granularity::Day)]
    #[case(Granularity::Week)]
    #[case(Granularity::Month)]
    #[case(Granularity::Quarter)]
    #[case(Granularity::Year)]
    fn buckets_are_strictly_ascending_and_cover_min(#[case] granularity: Granularity) {
        let min = date(2024, 2, 14);
        let axis = TimeAxis::build(min, date(2026, 7, 3), granularity);
        assert!(axis
            .buckets
            .windows(2)
            .all(|pair| pair[0].key < pair[1].key));
        // The first bucket starts on or before the range minimum.
        assert!(axis.buckets[0].key <= min);
    }

    #[rstest]
    #[case(Granularity::Day)]
    #[case(Granularity::Week)]
    #[case(Granularity::Month)]
    #[case(Granularity::Quarter)]
    #[case(Granularity::Year)]
    fn building_twice_yields_equal_axes(#[case] granularity: Granularity) {
        let a = TimeAxis::build(date(2024, 3, 1), date(2025, 9, 30), granularity);
        let b = TimeAxis::build(date(2024, 3, 1), date(2025, 9, 30), granularity);
        assert_eq!(a, b);
    }

    #[test]
    fn day_bucket_count_is_inclusive() {
        let axis = TimeAxis::build(date(2024, 11, 1), date(2024, 11, 10), Granularity::Day);
        assert_eq!(axis.len(), 10);
        assert_eq!(axis.buckets[0].label, "01 Nov");
        assert_eq!(axis.buckets[9].label, "10 Nov");
    }

    #[test]
    fn day_buckets_respect_leap_years() {
        // 2024 is a leap year, 2023 is not.
        let leap = TimeAxis::build(date(2024, 2, 1), date(2024, 3, 1), Granularity::Day);
        assert_eq!(leap.len(), 30);
        assert_eq!(leap.buckets[28].label, "29 Feb");

        let common = TimeAxis::build(date(2023, 2, 1), date(2023, 3, 1), Granularity::Day);
        assert_eq!(common.len(), 29);

        let full_year = TimeAxis::build(date(2024, 1, 1), date(2024, 12, 31), Granularity::Day);
        assert_eq!(full_year.len(), 366);
    }

    #[test]
    fn day_buckets_roll_over_year_boundary() {
        let axis = TimeAxis::build(date(2024, 12, 30), date(2025, 1, 2), Granularity::Day);
        assert_eq!(axis.len(), 4);
        assert_eq!(axis.buckets[2].key, date(2025, 1, 1));
    }

    #[test]
    fn week_buckets_stride_from_min_and_may_overrun_max() {
        let axis = TimeAxis::build(date(2024, 11, 1), date(2024, 11, 10), Granularity::Week);
        assert_eq!(axis.len(), 2);
        assert_eq!(axis.buckets[0].key, date(2024, 11, 1));
        assert_eq!(axis.buckets[0].label, "01 Nov - 07 Nov");
        assert_eq!(axis.buckets[1].key, date(2024, 11, 8));
        // Second bucket runs to Nov 14, four days past max. Acceptable.
        assert_eq!(axis.buckets[1].label, "08 Nov - 14 Nov");
    }

    #[test]
    fn month_axis_covers_whole_years_with_twelve_bucket_headers() {
        let axis = TimeAxis::build(date(2024, 11, 5), date(2025, 2, 20), Granularity::Month);
        assert_eq!(axis.len(), 24);
        assert_eq!(axis.headers.len(), 2);
        for header in &axis.headers {
            assert_eq!(header.span, 12);
        }
        assert_eq!(axis.headers[0].label, "2024");
        assert_eq!(axis.headers[1].label, "2025");
        assert_eq!(axis.buckets[0].key, date(2024, 1, 1));
        assert_eq!(axis.buckets[0].label, "Jan");
        assert_eq!(axis.buckets[23].key, date(2025, 12, 1));
    }

    #[test]
    fn quarter_axis_has_four_bucket_headers_per_year() {
        let axis = TimeAxis::build(date(2024, 5, 1), date(2025, 8, 1), Granularity::Quarter);
        assert_eq!(axis.len(), 8);
        assert_eq!(axis.headers.len(), 2);
        for header in &axis.headers {
            assert_eq!(header.span, 4);
        }
        let labels: Vec<&str> = axis.buckets[..4].iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["(Jan-Mar)", "(Apr-Jun)", "(Jul-Sep)", "(Oct-Dec)"]);
        assert_eq!(axis.buckets[1].key, date(2024, 4, 1));
    }

    #[test]
    fn year_axis_has_single_range_header() {
        let axis = TimeAxis::build(date(2024, 6, 1), date(2027, 2, 1), Granularity::Year);
        assert_eq!(axis.len(), 4);
        assert_eq!(axis.headers.len(), 1);
        assert_eq!(axis.headers[0].label, "2024 - 2027");
        assert_eq!(axis.headers[0].span, 4);
        assert_eq!(axis.buckets[0].label, "2024");
        assert_eq!(axis.buckets[3].label, "2027");
    }

    #[test]
    fn position_of_matches_keys_exactly() {
        let axis = TimeAxis::build(date(2024, 11, 1), date(2025, 3, 1), Granularity::Month);
        assert_eq!(axis.position_of(date(2024, 11, 1)), Some(10));
        // Mid-month date is inside a bucket but not on its key.
        assert_eq!(axis.position_of(date(2024, 11, 15)), None);
    }
}
