use chrono::{DateTime, Datelike, Days, Duration, Months, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    years: u32,
    months: u32,
    days: u32,
}

impl Step {
    pub const WEEK: Step = Step {
        years: 0,
        months: 0,
        days: 7,
    };

    /// Returns `None` for a zero step.
    pub fn new(years: u32, months: u32, days: u32) -> Option<Self> {
        if years == 0 && months == 0 && days == 0 {
            return None;
        }
        Some(Self {
            years,
            months,
            days,
        })
    }

    fn advance(self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        from.checked_add_months(Months::new(months))?
            .checked_add_days(Days::new(u64::from(self.days)))
    }
}

/// Half-open interval `[start, end)` covered by one weekly chart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateSpan {
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Splits `[start, end)` into contiguous spans of `step`, the last one clamped to `end`.
pub fn span_range(start: DateTime<Utc>, end: DateTime<Utc>, step: Step) -> Vec<DateSpan> {
    let mut spans = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let next = step
            .advance(cursor)
            .filter(|next| *next < end)
            .unwrap_or(end);
        spans.push(DateSpan {
            start: cursor,
            end: next,
        });
        cursor = next;
    }
    spans
}

/// Noon on the Sunday that begins the week containing `start`.
pub fn week_aligned(start: DateTime<Utc>) -> DateTime<Utc> {
    let date = start.date_naive();
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back))
        .and_then(|sunday| sunday.and_hms_opt(12, 0, 0))
        .map(|noon| noon.and_utc())
        .unwrap_or(start)
}

pub fn weekly_spans(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateSpan> {
    span_range(week_aligned(start), end, Step::WEEK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn assert_covers(spans: &[DateSpan], start: DateTime<Utc>, end: DateTime<Utc>) {
        assert_eq!(spans.first().unwrap().start(), start);
        assert_eq!(spans.last().unwrap().end(), end);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        for span in spans {
            assert!(span.start() < span.end());
        }
    }

    #[test]
    fn ninety_one_days_make_thirteen_weeks() {
        let start = at(2015, 1, 1, 0);
        let end = start + Duration::days(91);
        let spans = span_range(start, end, Step::WEEK);
        assert_eq!(spans.len(), 13);
        assert!(spans.iter().all(|span| span.duration() == Duration::days(7)));
        assert_covers(&spans, start, end);
    }

    #[test]
    fn last_span_is_clamped_to_end() {
        let start = at(2015, 1, 1, 0);
        let end = start + Duration::days(10) + Duration::hours(5);
        let spans = span_range(start, end, Step::WEEK);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].duration(), Duration::days(3) + Duration::hours(5));
        assert_covers(&spans, start, end);
    }

    #[test]
    fn spans_are_contiguous_for_assorted_steps() {
        let cases = [
            (at(2014, 3, 9, 17), at(2015, 1, 2, 3), Step::WEEK),
            (at(2012, 1, 31, 0), at(2013, 6, 1, 0), Step::new(0, 1, 0).unwrap()),
            (at(2008, 2, 29, 12), at(2016, 3, 1, 0), Step::new(1, 0, 0).unwrap()),
            (at(2020, 5, 5, 5), at(2020, 5, 5, 6), Step::new(0, 0, 1).unwrap()),
            (at(2010, 10, 1, 0), at(2011, 10, 1, 0), Step::new(0, 2, 3).unwrap()),
        ];
        for (start, end, step) in cases {
            let spans = span_range(start, end, step);
            assert!(!spans.is_empty());
            assert_covers(&spans, start, end);
        }
    }

    #[test]
    fn month_steps_clamp_to_month_end() {
        let spans = span_range(at(2015, 1, 31, 0), at(2015, 4, 1, 0), Step::new(0, 1, 0).unwrap());
        assert_eq!(spans[0].end(), at(2015, 2, 28, 0));
        assert_eq!(spans[1].end(), at(2015, 3, 28, 0));
        assert_eq!(spans[2].end(), at(2015, 4, 1, 0));
    }

    #[test]
    fn empty_interval_yields_no_spans() {
        let start = at(2015, 1, 1, 0);
        assert!(span_range(start, start, Step::WEEK).is_empty());
        assert!(span_range(start, start - Duration::days(1), Step::WEEK).is_empty());
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(Step::new(0, 0, 0).is_none());
    }

    #[test]
    fn week_alignment_snaps_to_sunday_noon() {
        let aligned = week_aligned(at(2015, 1, 7, 18));
        assert_eq!(aligned, at(2015, 1, 4, 12));
        assert_eq!(aligned.weekday(), Weekday::Sun);

        assert_eq!(week_aligned(at(2015, 1, 4, 3)), at(2015, 1, 4, 12));
    }

    #[test]
    fn weekly_spans_start_on_aligned_boundary() {
        let end = at(2015, 2, 1, 9);
        let spans = weekly_spans(at(2015, 1, 7, 18), end);
        assert_eq!(spans.len(), 4);
        assert_covers(&spans, at(2015, 1, 4, 12), end);
    }

    #[test]
    fn weekly_spans_empty_when_aligned_start_reaches_end() {
        assert!(weekly_spans(at(2015, 1, 4, 1), at(2015, 1, 4, 12)).is_empty());
    }
}
