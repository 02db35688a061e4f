use std::collections::BTreeMap;

use crate::data::Relation;
use crate::error::Result;
use crate::stats::summary::Summary;

/// Sanity range applied before curve aggregation: non-finite values and
/// values with `|v| >= limit` are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueGuard {
    pub limit: f64,
}

impl ValueGuard {
    pub fn admits(&self, value: f64) -> bool {
        value.is_finite() && value.abs() < self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub index: i64,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Curve {
    /// Sorted by index, ascending.
    pub points: Vec<CurvePoint>,
    /// Rows rejected by the value guard.
    pub dropped: usize,
}

impl Curve {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Mean and sample std of `value_column` for every distinct integer index.
/// Values are sorted within each index before summation, so the result does
/// not depend on row order.
pub fn curve_summary(
    relation: &Relation,
    index_column: &str,
    value_column: &str,
    guard: Option<ValueGuard>,
) -> Result<Curve> {
    let index = relation.ints(index_column)?;
    let values = relation.numeric(value_column)?;

    let mut dropped = 0usize;
    let mut by_index: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for (&i, &v) in index.iter().zip(&values) {
        if guard.is_some_and(|g| !g.admits(v)) {
            dropped += 1;
            continue;
        }
        by_index.entry(i).or_default().push(v);
    }

    let points = by_index
        .into_iter()
        .map(|(index, mut vals)| {
            vals.sort_by(f64::total_cmp);
            CurvePoint {
                index,
                summary: Summary::of(&vals),
            }
        })
        .collect();
    Ok(Curve { points, dropped })
}
