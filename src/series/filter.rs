//! Date-window filter applied before summarization (forced crop).

use crate::domain::{DataPoint, DateRange, KeyKind};
use crate::error::AppError;

/// Points kept by the filter and the ones it removed.
#[derive(Debug, Clone, Default)]
pub struct Filtered {
    pub kept: Vec<DataPoint>,
    pub excluded: Vec<DataPoint>,
}

/// Keep points with `start <= key <= end` for each bound that is set.
///
/// `None` (cropping disabled) or an unbounded range returns the input as-is.
/// Bounds on a name-keyed series are a configuration error rather than a
/// silent no-op, even when the series has no points.
pub fn apply_range(
    points: Vec<DataPoint>,
    key_kind: KeyKind,
    range: Option<&DateRange>,
) -> Result<Filtered, AppError> {
    let Some(range) = range.filter(|r| !r.is_unbounded()) else {
        return Ok(Filtered {
            kept: points,
            excluded: Vec::new(),
        });
    };
    if key_kind == KeyKind::Name {
        return Err(AppError::config("Date range filter applied to a name-keyed series."));
    }

    let mut kept = Vec::with_capacity(points.len());
    let mut excluded = Vec::new();
    for p in points {
        let Some(date) = p.key.as_date() else {
            return Err(AppError::config(format!(
                "Date range filter found non-date key '{}'.",
                p.key
            )));
        };
        if range.contains(date) {
            kept.push(p);
        } else {
            excluded.push(p);
        }
    }

    if !excluded.is_empty() {
        log::debug!("range filter excluded {} point(s)", excluded.len());
    }
    Ok(Filtered { kept, excluded })
}
