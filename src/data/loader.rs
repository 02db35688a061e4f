use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::data::relation::{ColumnData, Relation};
use crate::data::schema::{ColumnKind, Schema};
use crate::error::{FigureError, Result};

/// Reads a CSV artefact and keeps the columns declared by `schema`.
pub fn load(path: &Path, schema: &Schema) -> Result<Relation> {
    if !path.exists() {
        return Err(FigureError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let artefact = artefact_name(path);
    let csv_err = |source| FigureError::Csv {
        artefact: artefact.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let mut col_idx = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        col_idx.entry(name.to_string()).or_insert(i);
    }

    let mut indices = Vec::with_capacity(schema.columns.len());
    for spec in schema.columns {
        let idx = col_idx
            .get(spec.name)
            .copied()
            .ok_or_else(|| FigureError::Schema {
                artefact: artefact.clone(),
                column: spec.name.to_string(),
            })?;
        indices.push(idx);
    }

    let mut columns: Vec<ColumnData> = schema
        .columns
        .iter()
        .map(|spec| match spec.kind {
            ColumnKind::Int => ColumnData::Int(Vec::new()),
            ColumnKind::Float => ColumnData::Float(Vec::new()),
            ColumnKind::Text => ColumnData::Text(Vec::new()),
        })
        .collect();

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        for ((spec, &idx), column) in schema.columns.iter().zip(&indices).zip(&mut columns) {
            let cell = record.get(idx).unwrap_or("");
            let parse_err = || FigureError::Parse {
                artefact: artefact.clone(),
                row,
                column: spec.name.to_string(),
                value: cell.to_string(),
                kind: spec.kind.label(),
            };
            match column {
                ColumnData::Int(values) => values.push(parse_int(cell).ok_or_else(parse_err)?),
                ColumnData::Float(values) => {
                    values.push(parse_float(cell).ok_or_else(parse_err)?)
                }
                ColumnData::Text(values) => values.push(cell.to_string()),
            }
        }
    }

    let named = schema
        .columns
        .iter()
        .map(|spec| spec.name)
        .zip(columns)
        .collect();
    let relation = Relation::from_columns(artefact, named)?;
    debug!(
        schema = schema.name,
        "loaded {} ({} rows, {} columns)",
        relation.artefact(),
        relation.len(),
        schema.columns.len()
    );
    Ok(relation)
}

fn artefact_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Accepts `4` as well as integral float spellings such as `4.0`.
fn parse_int(cell: &str) -> Option<i64> {
    if let Ok(v) = cell.parse::<i64>() {
        return Some(v);
    }
    let x = cell.parse::<f64>().ok()?;
    if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

/// Empty cells read as NaN; `nan`, `inf` and `-inf` parse as usual.
fn parse_float(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_accepts_integral_floats() {
        assert_eq!(parse_int("8"), Some(8));
        assert_eq!(parse_int("16.0"), Some(16));
        assert_eq!(parse_int("0.5"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn parse_float_reads_missing_and_non_finite() {
        assert!(parse_float("").unwrap().is_nan());
        assert!(parse_float("nan").unwrap().is_nan());
        assert_eq!(parse_float("inf"), Some(f64::INFINITY));
        assert_eq!(parse_float("-0.25"), Some(-0.25));
        assert_eq!(parse_float("abc"), None);
    }
}
