//! Duplicate-key resolution.
//!
//! Several sources can report a value for the same date or name. The
//! summarizer collapses each such group into (at most) one point according to
//! the series' `Strategy`, keeping keys in the order they were first seen.
//!
//! Rules shared by the numeric strategies (aggregates and weighted mean):
//! - `NaN` values never feed a computation
//! - an all-`NaN` group becomes one `NaN` placeholder noting that no usable
//!   value was found
//! - a group with exactly one usable value passes that point through untouched

use std::collections::HashMap;

use crate::domain::{DataPoint, DistributionEntry, PointKey, Strategy};
use crate::math::{self, Reducer};

/// Note attached to placeholders for groups without any usable value.
pub const NO_USABLE_VALUE: &str = "No usable value found";

/// How a group of points sharing a key becomes one point.
#[derive(Debug, Clone, Copy)]
pub enum Resolution {
    /// Reduce the usable values with a pure function.
    Reduce(Reducer),
    /// Sample-size weighted mean of the usable values.
    WeightedMean,
    First,
    Last,
    /// Drop the key entirely.
    Ignore,
}

/// Map each strategy to its resolution. Exhaustive, so a new strategy cannot
/// be added without deciding how it resolves.
pub fn resolution(strategy: Strategy) -> Resolution {
    match strategy {
        Strategy::Sum => Resolution::Reduce(math::sum),
        Strategy::Avg => Resolution::Reduce(math::mean),
        Strategy::Product => Resolution::Reduce(math::product),
        Strategy::Min => Resolution::Reduce(math::min),
        Strategy::Max => Resolution::Reduce(math::max),
        Strategy::Median => Resolution::Reduce(math::median),
        Strategy::Count => Resolution::Reduce(math::count),
        Strategy::WeightedMean => Resolution::WeightedMean,
        Strategy::First => Resolution::First,
        Strategy::Last => Resolution::Last,
        Strategy::Ignore => Resolution::Ignore,
    }
}

/// Resolve duplicate keys so each key appears once, in first-seen order.
///
/// If every key is already unique the input is returned unchanged.
pub fn summarize(points: Vec<DataPoint>, strategy: Strategy) -> Vec<DataPoint> {
    let groups = group_by_key(&points);
    if groups.len() == points.len() {
        return points;
    }

    let how = resolution(strategy);
    let mut slots: Vec<Option<DataPoint>> = points.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(groups.len());
    let mut resolved = 0usize;
    let mut dropped = 0usize;

    for group in groups {
        let mut members: Vec<DataPoint> = group.iter().filter_map(|&i| slots[i].take()).collect();
        if members.len() == 1 {
            out.append(&mut members);
            continue;
        }

        resolved += 1;
        match resolve_group(strategy, how, members) {
            Some(point) => out.push(point),
            None => dropped += 1,
        }
    }

    log::debug!(
        "{strategy}: resolved {resolved} duplicate key group(s), dropped {dropped}, {} point(s) out",
        out.len()
    );
    out
}

/// Indices of points per distinct key, groups ordered by first occurrence.
fn group_by_key(points: &[DataPoint]) -> Vec<Vec<usize>> {
    let mut index: HashMap<&PointKey, usize> = HashMap::with_capacity(points.len());
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, p) in points.iter().enumerate() {
        match index.get(&p.key) {
            Some(&g) => groups[g].push(i),
            None => {
                index.insert(&p.key, groups.len());
                groups.push(vec![i]);
            }
        }
    }
    groups
}

fn resolve_group(strategy: Strategy, how: Resolution, members: Vec<DataPoint>) -> Option<DataPoint> {
    match how {
        Resolution::First => members.into_iter().next(),
        Resolution::Last => members.into_iter().last(),
        Resolution::Ignore => None,
        Resolution::Reduce(reduce) => resolve_usable(members, |key, usable| {
            let values: Vec<f64> = usable.iter().map(|p| p.value).collect();
            let n = usable.len();
            // Per-source sample sizes are summed only when every source has one.
            let sample_size = usable
                .iter()
                .try_fold(0u64, |acc, p| p.sample_size.map(|s| acc.saturating_add(s)))
                .unwrap_or(n as u64);
            DataPoint::new(key, reduce(&values))
                .with_note(format!("{} of {n} values found", strategy.label()))
                .with_sample_size(sample_size)
                .with_distribution(distribution(&usable))
        }),
        Resolution::WeightedMean => resolve_usable(members, |key, usable| {
            let pairs: Vec<(f64, f64)> = usable
                .iter()
                .map(|p| (p.value, p.sample_size.unwrap_or(1) as f64))
                .collect();
            let total = usable
                .iter()
                .fold(0u64, |acc, p| acc.saturating_add(p.sample_size.unwrap_or(1)));
            DataPoint::new(key, math::weighted_mean(&pairs))
                .with_note(format!("Weighted mean of {} sources (N={total})", usable.len()))
                .with_sample_size(total)
                .with_distribution(distribution(&usable))
        }),
    }
}

/// Apply the shared NaN/singleton rules, calling `combine` only for groups
/// with two or more usable points.
fn resolve_usable<F>(members: Vec<DataPoint>, combine: F) -> Option<DataPoint>
where
    F: FnOnce(PointKey, &[DataPoint]) -> DataPoint,
{
    let key = members.first()?.key.clone();
    let mut usable: Vec<DataPoint> = members.into_iter().filter(|p| !p.is_missing()).collect();
    match usable.len() {
        0 => Some(DataPoint::missing(key, NO_USABLE_VALUE)),
        1 => usable.pop(),
        _ => Some(combine(key, &usable)),
    }
}

fn distribution(points: &[DataPoint]) -> Vec<DistributionEntry> {
    points.iter().map(DataPoint::distribution_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, value: f64) -> DataPoint {
        DataPoint::new(PointKey::Name(name.to_string()), value)
    }

    fn keys(points: &[DataPoint]) -> Vec<String> {
        points.iter().map(|p| p.key.to_string()).collect()
    }

    #[test]
    fn unique_keys_pass_through_for_every_strategy() {
        let points = vec![named("b", 1.0).with_note("kept"), named("a", 2.0), named("c", 3.0)];
        for strategy in Strategy::ALL {
            let out = summarize(points.clone(), strategy);
            assert_eq!(out, points, "strategy {strategy} altered unique input");
        }
    }

    #[test]
    fn ignore_drops_conflicting_keys() {
        let points = vec![named("a", 1.0), named("b", 2.0), named("a", 3.0), named("c", 4.0)];
        let out = summarize(points, Strategy::Ignore);
        assert_eq!(keys(&out), vec!["b", "c"]);
        assert_eq!(out[0].value, 2.0);
    }

    #[test]
    fn first_and_last_pick_by_scan_order() {
        let points = vec![
            named("k", 1.0).with_note("p1"),
            named("x", 9.0),
            named("k", 2.0).with_note("p2"),
            named("k", 3.0).with_note("p3"),
        ];
        let first = summarize(points.clone(), Strategy::First);
        assert_eq!(keys(&first), vec!["k", "x"]);
        assert_eq!(first[0].note.as_deref(), Some("p1"));
        assert_eq!(first[0].value, 1.0);

        let last = summarize(points, Strategy::Last);
        assert_eq!(keys(&last), vec!["k", "x"]);
        assert_eq!(last[0].note.as_deref(), Some("p3"));
        assert_eq!(last[0].value, 3.0);
    }

    #[test]
    fn avg_excludes_nan_and_notes_count() {
        let points = vec![named("k", 10.0), named("k", 20.0), named("k", f64::NAN)];
        let out = summarize(points, Strategy::Avg);
        assert_eq!(out.len(), 1);
        assert!((out[0].value - 15.0).abs() < 1e-12);
        assert_eq!(out[0].note.as_deref(), Some("Average of 2 values found"));
        assert_eq!(out[0].sample_size, Some(2));
        let dist = out[0].distribution.as_ref().unwrap();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].value, 10.0);
        assert_eq!(dist[1].value, 20.0);
    }

    #[test]
    fn all_nan_group_yields_placeholder() {
        let points = vec![named("k", f64::NAN), named("k", f64::NAN), named("z", 1.0)];
        for strategy in [Strategy::Avg, Strategy::Sum, Strategy::WeightedMean] {
            let out = summarize(points.clone(), strategy);
            assert_eq!(keys(&out), vec!["k", "z"]);
            assert!(out[0].is_missing());
            assert_eq!(out[0].note.as_deref(), Some(NO_USABLE_VALUE));
            assert!(out[0].sample_size.is_none());
            assert!(out[0].distribution.is_none());
        }
    }

    #[test]
    fn single_usable_value_passes_through_unchanged() {
        let original = named("k", 7.0).with_note("source note").with_uri("http://s");
        let points = vec![named("k", f64::NAN), original.clone()];
        let out = summarize(points, Strategy::Median);
        assert_eq!(out, vec![original]);
    }

    #[test]
    fn median_even_and_odd() {
        let even = vec![named("k", 4.0), named("k", 1.0), named("k", 3.0), named("k", 2.0)];
        let out = summarize(even, Strategy::Median);
        assert!((out[0].value - 2.5).abs() < 1e-12);

        let odd = vec![named("k", 5.0), named("k", 1.0), named("k", 3.0)];
        let out = summarize(odd, Strategy::Median);
        assert!((out[0].value - 3.0).abs() < 1e-12);
    }

    #[test]
    fn count_counts_usable_points() {
        let points = vec![named("k", 100.0), named("k", 200.0), named("k", f64::NAN), named("k", 5.0)];
        let out = summarize(points, Strategy::Count);
        assert_eq!(out[0].value, 3.0);
        assert_eq!(out[0].note.as_deref(), Some("Count of 3 values found"));
    }

    #[test]
    fn sum_product_min_max() {
        let points = vec![named("k", 2.0), named("k", 3.0), named("k", 4.0)];
        assert_eq!(summarize(points.clone(), Strategy::Sum)[0].value, 9.0);
        assert_eq!(summarize(points.clone(), Strategy::Product)[0].value, 24.0);
        assert_eq!(summarize(points.clone(), Strategy::Min)[0].value, 2.0);
        assert_eq!(summarize(points, Strategy::Max)[0].value, 4.0);
    }

    #[test]
    fn aggregate_sample_size_sums_when_all_supplied() {
        let points = vec![named("k", 1.0).with_sample_size(4), named("k", 2.0).with_sample_size(6)];
        let out = summarize(points, Strategy::Sum);
        assert_eq!(out[0].sample_size, Some(10));

        let partial = vec![named("k", 1.0).with_sample_size(4), named("k", 2.0)];
        let out = summarize(partial, Strategy::Sum);
        assert_eq!(out[0].sample_size, Some(2));
    }

    #[test]
    fn weighted_mean_uses_sample_sizes() {
        let points = vec![named("k", 80.0).with_sample_size(10), named("k", 90.0).with_sample_size(5)];
        let out = summarize(points, Strategy::WeightedMean);
        assert!((out[0].value - (80.0 * 10.0 + 90.0 * 5.0) / 15.0).abs() < 1e-9);
        assert_eq!(out[0].note.as_deref(), Some("Weighted mean of 2 sources (N=15)"));
        assert_eq!(out[0].sample_size, Some(15));
        let dist = out[0].distribution.as_ref().unwrap();
        assert_eq!(dist[0].sample_size, Some(10));
        assert_eq!(dist[1].sample_size, Some(5));
    }

    #[test]
    fn weighted_mean_defaults_missing_weight_to_one() {
        let points = vec![named("k", 10.0).with_sample_size(3), named("k", 30.0)];
        let out = summarize(points, Strategy::WeightedMean);
        assert!((out[0].value - 15.0).abs() < 1e-12);
        assert_eq!(out[0].note.as_deref(), Some("Weighted mean of 2 sources (N=4)"));
    }

    #[test]
    fn weighted_mean_zero_total_weight_is_nan() {
        let points = vec![named("k", 10.0).with_sample_size(0), named("k", 30.0).with_sample_size(0)];
        let out = summarize(points, Strategy::WeightedMean);
        assert!(out[0].is_missing());
        assert_eq!(out[0].sample_size, Some(0));
    }

    #[test]
    fn singletons_keep_notes_and_first_seen_order() {
        let points = vec![
            named("c", 1.0).with_note("only c"),
            named("a", 2.0),
            named("c", 3.0),
            named("b", 4.0).with_note("only b"),
            named("a", 6.0),
        ];
        let out = summarize(points, Strategy::Avg);
        assert_eq!(keys(&out), vec!["c", "a", "b"]);
        assert!((out[0].value - 2.0).abs() < 1e-12);
        assert!((out[1].value - 4.0).abs() < 1e-12);
        assert_eq!(out[2].note.as_deref(), Some("only b"));
        assert!(out[2].distribution.is_none());
    }

    #[test]
    fn first_keeps_nan_point_when_it_comes_first() {
        let points = vec![named("k", f64::NAN), named("k", 1.0)];
        let out = summarize(points, Strategy::First);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_missing());
    }

    #[test]
    fn huge_sample_sizes_saturate_instead_of_overflowing() {
        let points = vec![named("k", 10.0).with_sample_size(u64::MAX), named("k", 30.0).with_sample_size(1)];

        let summed = summarize(points.clone(), Strategy::Sum);
        assert!((summed[0].value - 40.0).abs() < 1e-12);
        assert_eq!(summed[0].sample_size, Some(u64::MAX));

        let weighted = summarize(points, Strategy::WeightedMean);
        assert!((weighted[0].value - 10.0).abs() < 1e-9);
        assert_eq!(weighted[0].sample_size, Some(u64::MAX));
        assert_eq!(
            weighted[0].note.as_deref(),
            Some(format!("Weighted mean of 2 sources (N={})", u64::MAX).as_str())
        );
    }
}
