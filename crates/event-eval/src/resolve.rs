//! Active-interval resolution and value mapping.
//!
//! Given a sorted list of event tuples, resolution answers two questions
//! for a query time:
//!
//! 1. Which tuple is *active*? The active span of tuple `i` runs from its
//!    own start to tuple `i+1`'s start (half-open, lower-inclusive). The
//!    last tuple catches everything at or after its start. A tuple's own
//!    declared interval does NOT bound its span: tuples are event markers
//!    and need not be contiguous.
//! 2. What value does the active tuple produce? Its reported progress is
//!    direction-corrected against the value domain and mapped into it,
//!    clamped to the domain bounds.
//!
//! Everything here is deterministic and side-effect-free. Callers re-sort
//! whenever the tuple set changes.

use crate::types::{EventTuple, Resolution};

/// Sort tuples ascending by start time.
///
/// Stable insertion sort: tuples sharing a start time keep their input
/// order, so the last of an equal-start run wins the span scan (earlier
/// members get zero-width spans). Lists with fewer than two entries are
/// left untouched.
pub fn sort_by_start(tuples: &mut [EventTuple]) {
    for i in 1..tuples.len() {
        let mut j = i;
        while j > 0 && tuples[j - 1].start_time > tuples[j].start_time {
            tuples.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Index of the tuple active at `time`.
///
/// Defined as 0 when the list has fewer than two entries or when no span
/// test succeeds (time before every start). Callers index into the list
/// only through [`resolve`], which guards the empty case.
pub fn active_index(time: f64, tuples: &[EventTuple]) -> usize {
    if tuples.len() < 2 {
        return 0;
    }

    for i in 0..tuples.len() - 1 {
        if tuples[i].start_time <= time && time < tuples[i + 1].start_time {
            return i;
        }
    }

    let last = tuples.len() - 1;
    if time >= tuples[last].start_time {
        return last;
    }

    0
}

/// Resolve the active tuple for `time` and map its value.
///
/// `tuples` must already be sorted by start time (see [`sort_by_start`]).
/// Returns `None` only for an empty list.
pub fn resolve(time: f64, tuples: &[EventTuple]) -> Option<Resolution> {
    if tuples.is_empty() {
        return None;
    }

    let index = active_index(time, tuples);
    let tuple = &tuples[index];
    let (mapped_value, effective_progress) = map_tuple(tuple);

    Some(Resolution {
        active_index: index,
        interval: tuple.interval,
        value_domain: tuple.value_domain,
        mapped_value,
        raw_progress: tuple.raw_progress,
        effective_progress,
    })
}

/// Map a tuple's progress into its value domain.
///
/// Returns `(mapped_value, effective_progress)`. A singleton domain maps
/// to its single point for any progress. Otherwise progress is flipped
/// when the domain is reversed, scaled across the domain length, and the
/// result clamped into the domain. Clamping (never extrapolating) keeps
/// out-of-range progress from leaving the domain.
fn map_tuple(tuple: &EventTuple) -> (f64, f64) {
    let domain = tuple.value_domain;
    let raw = tuple.raw_progress.clamp(0.0, 1.0);

    if domain.is_singleton() {
        return (domain.midpoint(), raw);
    }

    let effective = if domain.is_reversed() { 1.0 - raw } else { raw };
    let mapped = domain.clamp(domain.min() + effective * domain.length());
    (mapped, effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ph_common::Span;

    fn make_tuple(start: f64, interval: (f64, f64), raw: f64, domain: (f64, f64)) -> EventTuple {
        EventTuple::new(
            start,
            Span::new(interval.0, interval.1),
            raw,
            Span::new(domain.0, domain.1),
        )
    }

    /// Two-event setup used across the end-to-end assertions:
    /// A = (start 0, [0,10], domain [0,100]), B = (start 10, [10,20],
    /// domain [100,0] reversed).
    fn two_events(raw_a: f64, raw_b: f64) -> Vec<EventTuple> {
        vec![
            make_tuple(0.0, (0.0, 10.0), raw_a, (0.0, 100.0)),
            make_tuple(10.0, (10.0, 20.0), raw_b, (100.0, 0.0)),
        ]
    }

    #[test]
    fn sort_orders_by_start() {
        let mut tuples = vec![
            make_tuple(10.0, (10.0, 20.0), 0.0, (0.0, 1.0)),
            make_tuple(0.0, (0.0, 10.0), 0.0, (0.0, 1.0)),
            make_tuple(5.0, (5.0, 8.0), 0.0, (0.0, 1.0)),
        ];
        sort_by_start(&mut tuples);
        let starts: Vec<f64> = tuples.iter().map(|t| t.start_time).collect();
        assert_eq!(starts, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn equal_start_times_keep_insertion_order() {
        let mut tuples = vec![
            make_tuple(8.0, (8.0, 9.0), 0.0, (3.0, 3.0)),
            make_tuple(5.0, (5.0, 6.0), 0.0, (1.0, 1.0)),
            make_tuple(5.0, (5.0, 7.0), 0.0, (2.0, 2.0)),
        ];
        sort_by_start(&mut tuples);
        // stable: both start-5 tuples keep their relative order
        assert_eq!(tuples[0].value_domain, Span::new(1.0, 1.0));
        assert_eq!(tuples[1].value_domain, Span::new(2.0, 2.0));

        // the last of the equal-start run owns the span from 5 to 8;
        // the first member's span is zero-width
        assert_eq!(active_index(5.0, &tuples), 1);
        assert_eq!(active_index(6.5, &tuples), 1);
        assert_eq!(active_index(8.0, &tuples), 2);
    }

    #[test]
    fn span_rule_matches_half_open_definition() {
        let tuples = vec![
            make_tuple(0.0, (0.0, 10.0), 0.0, (0.0, 1.0)),
            make_tuple(10.0, (10.0, 20.0), 0.0, (0.0, 1.0)),
            make_tuple(20.0, (20.0, 30.0), 0.0, (0.0, 1.0)),
        ];
        assert_eq!(active_index(0.0, &tuples), 0);
        assert_eq!(active_index(9.999, &tuples), 0);
        assert_eq!(active_index(10.0, &tuples), 1);
        assert_eq!(active_index(19.999, &tuples), 1);
        assert_eq!(active_index(20.0, &tuples), 2);
        assert_eq!(active_index(1000.0, &tuples), 2);
    }

    #[test]
    fn spans_ignore_declared_interval_ends() {
        // the first event's interval ends at 4, but its span still runs
        // to the next start
        let tuples = vec![
            make_tuple(0.0, (0.0, 4.0), 0.0, (0.0, 1.0)),
            make_tuple(10.0, (10.0, 20.0), 0.0, (0.0, 1.0)),
        ];
        assert_eq!(active_index(7.0, &tuples), 0);
    }

    #[test]
    fn defaults_to_first_tuple() {
        let tuples = two_events(0.0, 0.0);
        // before every start: no span matches, falls back to index 0
        assert_eq!(active_index(-5.0, &tuples), 0);

        let single = vec![make_tuple(10.0, (10.0, 20.0), 0.0, (0.0, 1.0))];
        assert_eq!(active_index(0.0, &single), 0);
        assert_eq!(active_index(50.0, &single), 0);
    }

    #[test]
    fn resolve_empty_is_none() {
        assert_eq!(resolve(0.0, &[]), None);
    }

    #[test]
    fn forward_domain_maps_linearly() {
        let tuples = two_events(0.5, 0.0);
        let resolution = resolve(5.0, &tuples).unwrap();
        assert_eq!(resolution.active_index, 0);
        assert_eq!(resolution.mapped_value, 50.0);
        assert_eq!(resolution.effective_progress, 0.5);
        assert_eq!(resolution.raw_progress, 0.5);
    }

    #[test]
    fn reversed_domain_flips_progress() {
        let tuples = two_events(0.0, 0.5);
        let resolution = resolve(15.0, &tuples).unwrap();
        assert_eq!(resolution.active_index, 1);
        assert_eq!(resolution.raw_progress, 0.5);
        assert_eq!(resolution.effective_progress, 0.5);
        assert_eq!(resolution.mapped_value, 50.0);
    }

    #[test]
    fn reversed_domain_endpoints() {
        let tuple = make_tuple(0.0, (0.0, 10.0), 0.0, (10.0, 0.0));
        let at_start = resolve(0.0, &[tuple]).unwrap();
        assert_eq!(at_start.mapped_value, 10.0);

        let tuple = make_tuple(0.0, (0.0, 10.0), 1.0, (10.0, 0.0));
        let at_end = resolve(0.0, &[tuple]).unwrap();
        assert_eq!(at_end.mapped_value, 0.0);
    }

    #[test]
    fn singleton_domain_maps_to_its_point() {
        for raw in [0.0, 0.25, 0.7, 1.0] {
            let tuple = make_tuple(0.0, (0.0, 10.0), raw, (5.0, 5.0));
            let resolution = resolve(3.0, &[tuple]).unwrap();
            assert_eq!(resolution.mapped_value, 5.0);
        }
    }

    #[test]
    fn past_last_start_clamps_not_extrapolates() {
        // B stays active past its own interval end; its value comes from
        // its stored progress, never re-derived from the query time
        let tuples = two_events(0.0, 0.75);
        let resolution = resolve(25.0, &tuples).unwrap();
        assert_eq!(resolution.active_index, 1);
        assert_eq!(resolution.effective_progress, 0.25);
        assert_eq!(resolution.mapped_value, 25.0);
        assert_eq!(resolution.status_text(25.0), "OUTSIDE");
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let tuple = make_tuple(0.0, (0.0, 10.0), 1.5, (0.0, 100.0));
        let resolution = resolve(0.0, &[tuple]).unwrap();
        assert_eq!(resolution.mapped_value, 100.0);

        let tuple = make_tuple(0.0, (0.0, 10.0), -0.5, (0.0, 100.0));
        let resolution = resolve(0.0, &[tuple]).unwrap();
        assert_eq!(resolution.mapped_value, 0.0);
    }
}
