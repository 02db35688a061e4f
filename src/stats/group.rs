use std::fmt;

use crate::data::{ColumnData, Relation};
use crate::error::{FigureError, Result};
use crate::stats::summary::Summary;

/// How one key column is compared when grouping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyMatch {
    Exact,
    /// Absolute tolerance on the float value.
    Tolerance(f64),
}

impl KeyMatch {
    pub fn matches(self, a: KeyValue, b: KeyValue) -> bool {
        match (self, a, b) {
            (KeyMatch::Exact, KeyValue::Int(x), KeyValue::Int(y)) => x == y,
            (KeyMatch::Exact, x, y) => x.as_f64() == y.as_f64(),
            (KeyMatch::Tolerance(tol), x, y) => (x.as_f64() - y.as_f64()).abs() <= tol,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyColumn {
    pub name: &'static str,
    pub matching: KeyMatch,
}

impl KeyColumn {
    pub fn exact(name: &'static str) -> Self {
        Self {
            name,
            matching: KeyMatch::Exact,
        }
    }

    pub fn tolerance(name: &'static str, tolerance: f64) -> Self {
        Self {
            name,
            matching: KeyMatch::Tolerance(tolerance),
        }
    }

    fn values(&self, relation: &Relation) -> Result<Vec<KeyValue>> {
        Ok(match (self.matching, relation.column(self.name)?) {
            (KeyMatch::Exact, ColumnData::Int(v)) => v.iter().map(|&x| KeyValue::Int(x)).collect(),
            _ => relation
                .numeric(self.name)?
                .into_iter()
                .map(KeyValue::Float)
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyValue {
    Int(i64),
    Float(f64),
}

impl KeyValue {
    pub fn as_f64(self) -> f64 {
        match self {
            KeyValue::Int(x) => x as f64,
            KeyValue::Float(x) => x,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(x) => write!(f, "{x}"),
            KeyValue::Float(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupKey(pub Vec<KeyValue>);

impl GroupKey {
    pub fn matches(&self, other: &GroupKey, keys: &[KeyColumn]) -> bool {
        self.0.len() == other.0.len()
            && self.0.len() == keys.len()
            && keys
                .iter()
                .zip(self.0.iter().zip(&other.0))
                .all(|(k, (a, b))| k.matching.matches(*a, *b))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEntry {
    pub key: GroupKey,
    pub label: String,
}

/// Closed, ordered universe of categories. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalOrder {
    entries: Vec<CanonicalEntry>,
}

impl CanonicalOrder {
    pub fn new(entries: Vec<CanonicalEntry>) -> Self {
        Self { entries }
    }

    /// (ensemble size, density) combinations labelled `N=4, n=0.4`.
    pub fn quads(quads: &[(i64, f64)]) -> Self {
        Self::new(
            quads
                .iter()
                .map(|&(size, density)| CanonicalEntry {
                    key: GroupKey(vec![KeyValue::Int(size), KeyValue::Float(density)]),
                    label: quad_label(size, density),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CanonicalEntry] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    pub fn position(&self, key: &GroupKey, keys: &[KeyColumn]) -> Option<usize> {
        self.entries.iter().position(|e| e.key.matches(key, keys))
    }
}

pub fn quad_label(size: i64, density: f64) -> String {
    format!("N={size}, n={density:.1}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: GroupKey,
    pub rows: Vec<usize>,
}

/// Groups rows by `keys`; a row joins the first group whose key matches it
/// under each column's comparison. Groups are returned in first-seen order.
pub fn group_by(relation: &Relation, keys: &[KeyColumn]) -> Result<Vec<Group>> {
    let columns = keys
        .iter()
        .map(|k| k.values(relation))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: Vec<Group> = Vec::new();
    for row in 0..relation.len() {
        let key = GroupKey(columns.iter().map(|c| c[row]).collect());
        match groups.iter_mut().find(|g| g.key.matches(&key, keys)) {
            Some(group) => group.rows.push(row),
            None => groups.push(Group {
                key,
                rows: vec![row],
            }),
        }
    }
    Ok(groups)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalGroup {
    pub position: usize,
    pub label: String,
    pub rows: Vec<usize>,
}

impl CanonicalGroup {
    pub fn values(&self, column: &[f64]) -> Vec<f64> {
        self.rows.iter().map(|&r| column[r]).collect()
    }
}

/// Observed groups placed in canonical order. Categories with no rows are
/// absent; an observed key outside the canonical universe is an error.
pub fn canonical_groups(
    relation: &Relation,
    keys: &[KeyColumn],
    order: &CanonicalOrder,
) -> Result<Vec<CanonicalGroup>> {
    let mut out: Vec<CanonicalGroup> = Vec::new();
    for group in group_by(relation, keys)? {
        let position =
            order
                .position(&group.key, keys)
                .ok_or_else(|| FigureError::UnknownCategory {
                    artefact: relation.artefact().to_string(),
                    key: group.key.to_string(),
                })?;
        match out.iter_mut().find(|g| g.position == position) {
            Some(existing) => {
                existing.rows.extend(group.rows);
                existing.rows.sort_unstable();
            }
            None => out.push(CanonicalGroup {
                position,
                label: order.entries()[position].label.clone(),
                rows: group.rows,
            }),
        }
    }
    out.sort_by_key(|g| g.position);
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub position: usize,
    pub label: String,
    pub summary: Summary,
}

/// Mean, sample std and count of `value_column` per observed category, in
/// canonical order. Non-finite values are left out of the summary.
pub fn group_summary(
    relation: &Relation,
    keys: &[KeyColumn],
    value_column: &str,
    order: &CanonicalOrder,
) -> Result<Vec<CategorySummary>> {
    let values = relation.numeric(value_column)?;
    Ok(canonical_groups(relation, keys, order)?
        .into_iter()
        .map(|g| {
            let finite: Vec<f64> = g
                .values(&values)
                .into_iter()
                .filter(|v| v.is_finite())
                .collect();
            CategorySummary {
                position: g.position,
                summary: Summary::of(&finite),
                label: g.label,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_match_is_inclusive() {
        let m = KeyMatch::Tolerance(0.05);
        assert!(m.matches(KeyValue::Float(0.4), KeyValue::Float(0.44)));
        assert!(!m.matches(KeyValue::Float(0.4), KeyValue::Float(0.5)));
        assert!(KeyMatch::Exact.matches(KeyValue::Int(8), KeyValue::Float(8.0)));
        assert!(!KeyMatch::Exact.matches(KeyValue::Int(8), KeyValue::Int(4)));
    }

    #[test]
    fn quad_labels_use_one_decimal() {
        let order = CanonicalOrder::quads(&[(4, 0.4), (8, 0.8)]);
        assert_eq!(order.labels(), vec!["N=4, n=0.4", "N=8, n=0.8"]);
        let key = GroupKey(vec![KeyValue::Int(8), KeyValue::Float(0.80001)]);
        let keys = [KeyColumn::exact("N"), KeyColumn::tolerance("n", 0.05)];
        assert_eq!(order.position(&key, &keys), Some(1));
        assert_eq!(key.to_string(), "(8, 0.80001)");
    }
}
