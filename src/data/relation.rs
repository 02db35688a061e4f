use crate::data::schema::ColumnKind;
use crate::error::{FigureError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Int(_) => ColumnKind::Int,
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Int(v) => ColumnData::Int(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Float(v) => ColumnData::Float(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }

    fn extend(&mut self, other: &ColumnData) -> bool {
        match (self, other) {
            (ColumnData::Int(a), ColumnData::Int(b)) => a.extend_from_slice(b),
            (ColumnData::Float(a), ColumnData::Float(b)) => a.extend_from_slice(b),
            (ColumnData::Text(a), ColumnData::Text(b)) => a.extend(b.iter().cloned()),
            _ => return false,
        }
        true
    }
}

/// Column-wise table holding only the columns declared for its artefact.
/// All columns have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    artefact: String,
    columns: Vec<(String, ColumnData)>,
    len: usize,
}

impl Relation {
    pub fn from_columns(
        artefact: impl Into<String>,
        columns: Vec<(&str, ColumnData)>,
    ) -> Result<Self> {
        let artefact = artefact.into();
        let len = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        for (name, data) in &columns {
            if data.len() != len {
                return Err(FigureError::ColumnLength {
                    artefact,
                    column: name.to_string(),
                    expected: len,
                    found: data.len(),
                });
            }
        }
        Ok(Self {
            artefact,
            columns: columns
                .into_iter()
                .map(|(name, data)| (name.to_string(), data))
                .collect(),
            len,
        })
    }

    pub fn artefact(&self) -> &str {
        &self.artefact
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Result<&ColumnData> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
            .ok_or_else(|| FigureError::Schema {
                artefact: self.artefact.clone(),
                column: name.to_string(),
            })
    }

    pub fn ints(&self, name: &str) -> Result<&[i64]> {
        match self.column(name)? {
            ColumnData::Int(v) => Ok(v),
            _ => Err(self.type_error(name, ColumnKind::Int)),
        }
    }

    pub fn floats(&self, name: &str) -> Result<&[f64]> {
        match self.column(name)? {
            ColumnData::Float(v) => Ok(v),
            _ => Err(self.type_error(name, ColumnKind::Float)),
        }
    }

    pub fn texts(&self, name: &str) -> Result<&[String]> {
        match self.column(name)? {
            ColumnData::Text(v) => Ok(v),
            _ => Err(self.type_error(name, ColumnKind::Text)),
        }
    }

    /// Integer or float column widened to `f64`.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>> {
        match self.column(name)? {
            ColumnData::Int(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            ColumnData::Float(v) => Ok(v.clone()),
            ColumnData::Text(_) => Err(self.type_error(name, ColumnKind::Float)),
        }
    }

    fn type_error(&self, name: &str, expected: ColumnKind) -> FigureError {
        FigureError::ColumnType {
            artefact: self.artefact.clone(),
            column: name.to_string(),
            expected: expected.label(),
        }
    }

    pub fn take_rows(&self, rows: &[usize]) -> Relation {
        Relation {
            artefact: self.artefact.clone(),
            columns: self
                .columns
                .iter()
                .map(|(name, data)| (name.clone(), data.take(rows)))
                .collect(),
            len: rows.len(),
        }
    }

    fn retain(&self, keep: impl Fn(usize) -> bool) -> Relation {
        let rows: Vec<usize> = (0..self.len).filter(|&i| keep(i)).collect();
        self.take_rows(&rows)
    }

    /// Rows where `|value - target| <= tolerance`. An empty result is not an error.
    pub fn filter_near(&self, column: &str, target: f64, tolerance: f64) -> Result<Relation> {
        let values = self.numeric(column)?;
        Ok(self.retain(|i| (values[i] - target).abs() <= tolerance))
    }

    /// Inclusive range filter; NaN values never match.
    pub fn filter_between(&self, column: &str, lo: f64, hi: f64) -> Result<Relation> {
        let values = self.numeric(column)?;
        Ok(self.retain(|i| values[i] >= lo && values[i] <= hi))
    }

    pub fn filter_text(&self, column: &str, value: &str) -> Result<Relation> {
        let values = self.texts(column)?;
        Ok(self.retain(|i| values[i] == value))
    }

    /// Appends the rows of `other`; both relations must carry the same columns.
    pub fn concat(&self, other: &Relation) -> Result<Relation> {
        let mut out = self.clone();
        out.artefact = format!("{} + {}", self.artefact, other.artefact);
        for (name, data) in out.columns.iter_mut() {
            let theirs = other.column(name)?;
            if !data.extend(theirs) {
                return Err(FigureError::ColumnType {
                    artefact: other.artefact.clone(),
                    column: name.clone(),
                    expected: data.kind().label(),
                });
            }
        }
        out.len += other.len;
        Ok(out)
    }

    pub fn with_float_column(mut self, name: &str, values: Vec<f64>) -> Result<Relation> {
        if values.len() != self.len {
            return Err(FigureError::ColumnLength {
                artefact: self.artefact,
                column: name.to_string(),
                expected: self.len,
                found: values.len(),
            });
        }
        self.columns.retain(|(n, _)| n != name);
        self.columns
            .push((name.to_string(), ColumnData::Float(values)));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Relation {
        Relation::from_columns(
            "sample",
            vec![
                ("N", ColumnData::Int(vec![4, 4, 8, 8])),
                ("n", ColumnData::Float(vec![0.4, 0.8, 0.4000001, 0.8])),
                (
                    "mode",
                    ColumnData::Text(vec![
                        "exact".into(),
                        "approx".into(),
                        "exact".into(),
                        "exact".into(),
                    ]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn filter_near_uses_tolerance() {
        let rel = sample().filter_near("n", 0.4, 1e-6).unwrap();
        assert_eq!(rel.len(), 2);
        assert_eq!(rel.ints("N").unwrap(), &[4, 8]);
    }

    #[test]
    fn filter_near_may_be_empty() {
        let rel = sample().filter_near("n", 0.6, 1e-6).unwrap();
        assert!(rel.is_empty());
        assert_eq!(rel.column_names().count(), 3);
    }

    #[test]
    fn filter_text_and_between() {
        let rel = sample().filter_text("mode", "exact").unwrap();
        assert_eq!(rel.len(), 3);
        let rel = rel.filter_between("N", 5.0, 10.0).unwrap();
        assert_eq!(rel.len(), 2);
    }

    #[test]
    fn undeclared_column_is_schema_error() {
        let err = sample().floats("d_eff").unwrap_err();
        assert!(matches!(err, FigureError::Schema { ref column, .. } if column == "d_eff"));
    }

    #[test]
    fn wrong_kind_is_type_error() {
        let err = sample().floats("N").unwrap_err();
        assert!(matches!(err, FigureError::ColumnType { .. }));
        assert_eq!(sample().numeric("N").unwrap(), vec![4.0, 4.0, 8.0, 8.0]);
    }

    #[test]
    fn concat_appends_rows() {
        let a = sample();
        let b = sample().filter_between("N", 8.0, 8.0).unwrap();
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.len(), 6);
        assert_eq!(joined.ints("N").unwrap()[4..], [8, 8]);
    }

    #[test]
    fn with_float_column_checks_length() {
        let err = sample().with_float_column("phi", vec![1.0]).unwrap_err();
        assert!(matches!(err, FigureError::ColumnLength { expected: 4, found: 1, .. }));
        let rel = sample()
            .with_float_column("phi", vec![0.1, 0.2, 0.3, 0.4])
            .unwrap();
        assert_eq!(rel.floats("phi").unwrap()[3], 0.4);
    }
}
