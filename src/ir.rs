use crate::data::ColumnKind;
use crate::layout::GridLayout;
use crate::scale::Axis;
use crate::stats::Bin;

// =============================================================================
// Figure plans: what to draw, before any pixels exist
// =============================================================================

/// Which pass produced a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureKind {
    Distribution(ColumnKind),
    Correlation,
}

impl FigureKind {
    /// Stable name, used for file names by sinks
    pub fn name(&self) -> String {
        match self {
            FigureKind::Distribution(kind) => format!("{}_distributions", kind.name()),
            FigureKind::Correlation => "correlation_matrix".to_string(),
        }
    }
}

/// A whole figure: size, grid and the content of every grid cell
#[derive(Debug, Clone)]
pub struct FigurePlan {
    pub kind: FigureKind,
    /// Size in figure units; converted to pixels at render time
    pub width_units: f64,
    pub height_units: f64,
    pub grid: GridLayout,
    /// Row-major, exactly `grid.cell_count()` entries
    pub cells: Vec<Cell>,
}

impl FigurePlan {
    pub fn panels(&self) -> impl Iterator<Item = &PanelPlan> {
        self.cells.iter().filter_map(|c| match c {
            Cell::Panel(p) => Some(&**p),
            _ => None,
        })
    }

    pub fn removed_count(&self) -> usize {
        self.cells.iter().filter(|c| matches!(c, Cell::Removed)).count()
    }
}

#[derive(Debug, Clone)]
pub enum Cell {
    Panel(Box<PanelPlan>),
    /// Inside the grid but unpopulated (plot limit reached); drawn as a blank frame
    Empty,
    /// Deleted trailing cell; nothing is drawn
    Removed,
}

/// A single subplot
#[derive(Debug, Clone)]
pub struct PanelPlan {
    pub column: String,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub rotate_x_labels: bool,
    pub geometry: Geometry,
}

#[derive(Debug, Clone)]
pub enum Geometry {
    /// Bars spanning bin edges; heights are counts
    Histogram { bins: Vec<Bin> },
    /// One bar per category index on the x axis
    Bars { counts: Vec<f64> },
    Heatmap(HeatmapPlan),
}

/// Masked correlation matrix with a diverging color scale
#[derive(Debug, Clone)]
pub struct HeatmapPlan {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
    /// `true` cells are not drawn
    pub mask: Vec<Vec<bool>>,
    pub center: f64,
    /// Color scale spans `center - limit ..= center + limit`
    pub limit: f64,
    /// Color bar height as a fraction of the panel height
    pub colorbar_shrink: f64,
    /// Gap between cells, in pixels
    pub line_width: u32,
}
