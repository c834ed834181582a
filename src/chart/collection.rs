use std::sync::Arc;

use rayon::prelude::*;

use crate::domain::{DateRange, Frequency, KeyKind, PointKey};
use crate::error::AppError;
use crate::series::{ComputedSeries, DataSeries};

/// A chart and the series it owns.
#[derive(Debug)]
pub struct Chart {
    pub title: String,
    pub description: Option<String>,
    pub units: Option<String>,
    pub goal: Option<f64>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    /// Only meaningful for date-keyed charts.
    pub frequency: Frequency,
    key_kind: KeyKind,
    range: DateRange,
    force_crop: bool,
    series: Vec<DataSeries>,
}

impl Chart {
    pub fn new(title: impl Into<String>, key_kind: KeyKind) -> Self {
        Self {
            title: title.into(),
            description: None,
            units: None,
            goal: None,
            range_min: None,
            range_max: None,
            frequency: Frequency::Monthly,
            key_kind,
            range: DateRange::default(),
            force_crop: false,
            series: Vec::new(),
        }
    }

    /// Set the chart's date window.
    ///
    /// With `force_crop`, points outside the window are removed from every
    /// series before summarization; without it the window is metadata only.
    pub fn with_range(mut self, range: DateRange, force_crop: bool) -> Result<Self, AppError> {
        if self.key_kind == KeyKind::Name && !range.is_unbounded() {
            return Err(AppError::config(format!(
                "Chart '{}' is keyed by name; start/end dates do not apply.",
                self.title
            )));
        }
        self.range = range;
        self.force_crop = force_crop;
        Ok(self)
    }

    pub fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn force_crop(&self) -> bool {
        self.force_crop
    }

    pub fn series(&self) -> &[DataSeries] {
        &self.series
    }

    pub fn add_series(&mut self, series: DataSeries) -> Result<(), AppError> {
        if series.key_kind() != self.key_kind {
            return Err(AppError::config(format!(
                "Series '{}' is keyed by {} but chart '{}' is keyed by {}.",
                series.title,
                series.key_kind().display_name(),
                self.title,
                self.key_kind.display_name()
            )));
        }
        self.series.push(series);
        Ok(())
    }

    /// The window handed to each series pipeline, if cropping applies.
    pub fn effective_range(&self) -> Option<&DateRange> {
        let applies = self.force_crop && self.key_kind == KeyKind::Date && !self.range.is_unbounded();
        applies.then_some(&self.range)
    }

    /// Compute every series. Results are in series order.
    pub fn compute_all(&self) -> Result<Vec<Arc<ComputedSeries>>, AppError> {
        let range = self.effective_range();
        self.series.par_iter().map(|s| s.compute(range)).collect()
    }

    /// Sorted unique keys across all series (names case-insensitive, dates
    /// chronological).
    pub fn identities(&self) -> Result<Vec<PointKey>, AppError> {
        Ok(identities(&self.compute_all()?))
    }
}

/// Sorted union of the keys in `computed`.
pub fn identities(computed: &[Arc<ComputedSeries>]) -> Vec<PointKey> {
    let mut keys: Vec<PointKey> = computed
        .iter()
        .flat_map(|c| c.points.iter().map(|p| p.key.clone()))
        .collect();
    keys.sort_by(|a, b| a.collate(b));
    keys.dedup();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Strategy;
    use crate::series::TextSource;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn text_series(title: &str, kind: KeyKind, text: &str) -> DataSeries {
        DataSeries::new(title, kind, Strategy::Avg, Box::new(TextSource::new(text)))
    }

    #[test]
    fn identities_are_sorted_and_unique() {
        let mut chart = Chart::new("c", KeyKind::Name);
        chart.add_series(text_series("s1", KeyKind::Name, "beta,1\nAlpha,2")).unwrap();
        chart.add_series(text_series("s2", KeyKind::Name, "alpha,3\nbeta,4\nGamma,5")).unwrap();
        let ids: Vec<String> = chart.identities().unwrap().iter().map(|k| k.to_string()).collect();
        assert_eq!(ids, vec!["Alpha", "alpha", "beta", "Gamma"]);
    }

    #[test]
    fn date_identities_are_chronological() {
        let mut chart = Chart::new("c", KeyKind::Date);
        chart.add_series(text_series("s1", KeyKind::Date, "03/01/2020,1\n01/01/2020,2")).unwrap();
        chart.add_series(text_series("s2", KeyKind::Date, "02/01/2020,1\n01/01/2020,2")).unwrap();
        let ids = chart.identities().unwrap();
        assert_eq!(
            ids,
            vec![
                PointKey::Date(date(2020, 1, 1)),
                PointKey::Date(date(2020, 2, 1)),
                PointKey::Date(date(2020, 3, 1)),
            ]
        );
    }

    #[test]
    fn crop_applies_only_when_forced() {
        let range = DateRange::new(Some(date(2020, 2, 1)), None).unwrap();

        let mut loose = Chart::new("c", KeyKind::Date).with_range(range, false).unwrap();
        loose.add_series(text_series("s", KeyKind::Date, "01/01/2020,1\n03/01/2020,2")).unwrap();
        assert!(loose.effective_range().is_none());
        assert_eq!(loose.compute_all().unwrap()[0].points.len(), 2);

        let mut cropped = Chart::new("c", KeyKind::Date).with_range(range, true).unwrap();
        cropped.add_series(text_series("s", KeyKind::Date, "01/01/2020,1\n03/01/2020,2")).unwrap();
        let out = cropped.compute_all().unwrap();
        assert_eq!(out[0].points.len(), 1);
        assert_eq!(out[0].excluded.len(), 1);
    }

    #[test]
    fn name_chart_rejects_date_window() {
        let range = DateRange::new(Some(date(2020, 1, 1)), None).unwrap();
        let err = Chart::new("c", KeyKind::Name).with_range(range, true).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn series_key_kind_must_match_chart() {
        let mut chart = Chart::new("c", KeyKind::Date);
        let err = chart.add_series(text_series("s", KeyKind::Name, "a,1")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(chart.series().is_empty());
    }

    #[test]
    fn results_keep_series_order() {
        let mut chart = Chart::new("c", KeyKind::Name);
        for i in 0..8 {
            chart.add_series(text_series(&format!("s{i}"), KeyKind::Name, &format!("k,{i}"))).unwrap();
        }
        let out = chart.compute_all().unwrap();
        let values: Vec<f64> = out.iter().map(|c| c.points[0].value).collect();
        assert_eq!(values, (0..8).map(f64::from).collect::<Vec<_>>());
    }
}
