//! Immutable panel descriptions consumed by the renderer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPlacement {
    UpperRight,
    UpperLeft,
    UpperCenter,
    LowerLeft,
    LowerRight,
    /// Centred vertically in the right margin reserved by `Margins::right`.
    OutsideRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Legend {
    pub placement: LegendPlacement,
    pub columns: usize,
}

impl Legend {
    pub fn at(placement: LegendPlacement) -> Self {
        Self {
            placement,
            columns: 1,
        }
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }
}

/// Fractions of the canvas kept for the plot: everything left of `right`
/// and below `top` (measured from the bottom edge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub right: f64,
    pub top: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            right: 1.0,
            top: 0.90,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    /// One tick per label at x = 0, 1, 2, ...
    Categorical(Vec<String>),
    Numeric { desc: String },
}

impl XAxis {
    pub fn tick_labels(&self) -> &[String] {
        match self {
            XAxis::Categorical(labels) => labels,
            XAxis::Numeric { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorPoint {
    pub x: f64,
    pub y: f64,
    /// Symmetric half-width; `None` draws the point without a bar.
    pub err: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSeries {
    pub label: String,
    pub marker: Marker,
    pub color: usize,
    pub points: Vec<ErrorPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBarPanel {
    pub x: XAxis,
    pub series: Vec<ErrorSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DualAxisPanel {
    pub x: XAxis,
    pub left: Vec<ErrorSeries>,
    pub right: Vec<ErrorSeries>,
    pub right_desc: String,
    pub right_range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudColor {
    Fixed(usize),
    /// Palette entry of the category position.
    ByCategory,
}

impl CloudColor {
    pub fn index(self, category: usize) -> usize {
        match self {
            CloudColor::Fixed(i) => i,
            CloudColor::ByCategory => category,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterCloud {
    pub label: Option<String>,
    pub marker: Marker,
    pub color: CloudColor,
    /// Fixed horizontal shift from the category position.
    pub offset: f64,
    /// Jitter is drawn uniformly from `[-jitter, jitter)`.
    pub jitter: f64,
    /// Raw values per category; an empty slot draws nothing.
    pub values: Vec<Vec<f64>>,
    /// Colour of the mean ± std marker; the cloud colour when `None`.
    pub summary_color: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPanel {
    pub categories: Vec<String>,
    pub clouds: Vec<ScatterCloud>,
    /// Joins the per-category summaries of each cloud with a line carrying
    /// this legend label.
    pub summary_line: Option<String>,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackComponent {
    pub label: String,
    pub color: usize,
    /// One fraction per category.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackedPanel {
    pub categories: Vec<String>,
    /// Stacked bottom to top in this order.
    pub components: Vec<StackComponent>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub x: f64,
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandCurve {
    pub label: String,
    pub color: usize,
    pub points: Vec<BandPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandPanel {
    pub x_desc: String,
    pub curves: Vec<BandCurve>,
    pub zero_line: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    ErrorBars(ErrorBarPanel),
    DualAxis(DualAxisPanel),
    JitterScatter(ScatterPanel),
    StackedFractions(StackedPanel),
    BandedCurves(BandPanel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    /// Output file stem, e.g. `fig03_partition_stability`.
    pub name: String,
    pub title: String,
    pub y_desc: String,
    pub y_range: Option<(f64, f64)>,
    pub legend: Legend,
    pub margins: Margins,
    pub body: PanelBody,
}
