use super::axis::TimeAxis;
use super::task::DateInterval;

/// Where a bar sits on the axis: its first bucket index and how many
/// buckets it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGeometry {
    pub start: usize,
    pub span: usize,
}

impl BarGeometry {
    /// Bar width as a percentage of one bucket column (one bucket = 100%).
    pub fn width_percent(&self) -> f32 {
        self.span as f32 * 100.0
    }
}

/// Map a date interval onto the axis.
///
/// Both endpoints must match a bucket key exactly; a start or end date that
/// falls between keys (common at week/month/quarter zoom) yields `None` and
/// the row renders without a bar. Reversed intervals yield `None` as well.
/// This never fails; an unmappable interval is a degraded rendering, not
/// an error.
pub fn map_interval(interval: DateInterval, axis: &TimeAxis) -> Option<BarGeometry> {
    if interval.is_reversed() {
        return None;
    }
    let start = axis.position_of(interval.start)?;
    let end = axis.position_of(interval.end)?;
    if end < start {
        return None;
    }
    Some(BarGeometry {
        start,
        span: end - start + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::axis::{Granularity, TimeAxis};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day_axis() -> TimeAxis {
        TimeAxis::build(date(2024, 11, 1), date(2024, 11, 10), Granularity::Day)
    }

    #[test]
    fn interval_maps_to_offset_and_span() {
        // Nov 1-5 on a Nov 1-10 day axis.
        let geometry =
            map_interval(DateInterval::new(date(2024, 11, 1), date(2024, 11, 5)), &day_axis())
                .unwrap();
        assert_eq!(geometry.start, 0);
        assert_eq!(geometry.span, 5);
        assert_eq!(geometry.width_percent(), 500.0);
    }

    #[test]
    fn single_day_interval_spans_one_bucket() {
        let geometry =
            map_interval(DateInterval::on(date(2024, 11, 3)), &day_axis()).unwrap();
        assert_eq!(geometry.start, 2);
        assert_eq!(geometry.span, 1);
        assert_eq!(geometry.width_percent(), 100.0);
    }

    #[test]
    fn unmatched_start_yields_none() {
        let axis = TimeAxis::build(date(2024, 1, 1), date(2024, 12, 31), Granularity::Month);
        // Nov 5 is inside the Nov bucket but is not its key.
        let geometry =
            map_interval(DateInterval::new(date(2024, 11, 5), date(2024, 12, 1)), &axis);
        assert_eq!(geometry, None);
    }

    #[test]
    fn unmatched_end_yields_none() {
        let geometry =
            map_interval(DateInterval::new(date(2024, 11, 1), date(2024, 11, 22)), &day_axis());
        assert_eq!(geometry, None);
    }

    #[test]
    fn month_aligned_interval_maps_on_month_axis() {
        let axis = TimeAxis::build(date(2024, 1, 1), date(2024, 12, 31), Granularity::Month);
        let geometry =
            map_interval(DateInterval::new(date(2024, 3, 1), date(2024, 6, 1)), &axis).unwrap();
        assert_eq!(geometry.start, 2);
        assert_eq!(geometry.span, 4);
    }

    #[test]
    fn reversed_interval_yields_none_even_when_both_dates_are_on_axis() {
        let geometry =
            map_interval(DateInterval::new(date(2024, 11, 8), date(2024, 11, 2)), &day_axis());
        assert_eq!(geometry, None);
    }

    #[test]
    fn empty_axis_yields_none() {
        let geometry = map_interval(DateInterval::on(date(2024, 11, 1)), &TimeAxis::default());
        assert_eq!(geometry, None);
    }

    #[test]
    fn planned_still_maps_when_actual_is_reversed() {
        // One task, two independent calls: the broken actual interval must
        // not take the planned bar down with it.
        let axis = day_axis();
        let planned = DateInterval::new(date(2024, 11, 2), date(2024, 11, 8));
        let actual = DateInterval::new(date(2024, 11, 9), date(2024, 11, 4));

        let planned_bar = map_interval(planned, &axis).unwrap();
        assert_eq!(planned_bar.start, 1);
        assert_eq!(planned_bar.span, 7);
        assert_eq!(map_interval(actual, &axis), None);
    }
}
