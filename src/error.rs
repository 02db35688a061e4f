use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum FigureError {
    #[error("artefact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{artefact}: missing required column `{column}`")]
    Schema { artefact: String, column: String },

    #[error("{artefact}: column `{column}` is not a {expected} column")]
    ColumnType {
        artefact: String,
        column: String,
        expected: &'static str,
    },

    #[error("{artefact}: column `{column}` has {found} rows, expected {expected}")]
    ColumnLength {
        artefact: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("{artefact}: category {key} is not in the canonical order")]
    UnknownCategory { artefact: String, key: String },

    #[error("{artefact}: row {row}: cannot parse `{column}` value {value:?} as {kind}")]
    Parse {
        artefact: String,
        row: usize,
        column: String,
        value: String,
        kind: &'static str,
    },

    #[error("{artefact}: {source}")]
    Csv {
        artefact: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("pdf conversion failed: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for FigureError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        FigureError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FigureError>;
