//! Figure planning: turns column buckets into [`FigurePlan`]s.
//!
//! All heuristics live here (grid sizing, top-K category limiting, label rotation,
//! log-axis triggers). Nothing in this module draws; see `graph` for rendering.

use crate::config::VisualizerConfig;
use crate::data::{Column, ColumnKind, Dataset};
use crate::ir::{Cell, FigureKind, FigurePlan, Geometry, HeatmapPlan, PanelPlan};
use crate::layout::GridLayout;
use crate::scale::{Axis, AxisScale, TickFormat};
use crate::stats::{correlation_matrix, histogram, skewness, sturges_bins, value_counts, value_range};

/// A value (or count) range above this switches the y axis to log scale
pub const LOG_RANGE_THRESHOLD: f64 = 1000.0;

/// Numeric columns with |skewness| above this get a log x axis
pub const SKEWNESS_THRESHOLD: f64 = 1.0;

/// Planned distribution figure plus whether the plot limit cut it short
#[derive(Debug, Clone)]
pub struct DistributionPlan {
    pub figure: FigurePlan,
    pub truncated: bool,
}

/// Lay out one panel per column of a bucket. `None` for an empty bucket.
pub fn plan_distributions(
    kind: ColumnKind,
    columns: &[&Column],
    config: &VisualizerConfig,
) -> Option<DistributionPlan> {
    let n_plots = columns.len();
    if n_plots == 0 {
        return None;
    }

    let grid = GridLayout::for_plots(n_plots, config.columns_per_row);
    let (width_units, mut height_units) = grid.figure_size(config.figure_size as f64);

    let mut cells = vec![Cell::Empty; grid.cell_count()];
    let mut truncated = false;
    let mut grown = false;

    for (index, column) in columns.iter().enumerate() {
        if index >= config.max_plots {
            truncated = true;
            break;
        }
        let panel = plan_panel(column, config);
        if panel.rotate_x_labels && !grown {
            // room for the rotated labels
            height_units += 1.0;
            grown = true;
        }
        cells[index] = Cell::Panel(Box::new(panel));
    }

    for index in grid.removed_cells(n_plots) {
        cells[index] = Cell::Removed;
    }

    Some(DistributionPlan {
        figure: FigurePlan {
            kind: FigureKind::Distribution(kind),
            width_units,
            height_units,
            grid,
            cells,
        },
        truncated,
    })
}

/// Pick the plot for a column from its kind
pub fn plan_panel(column: &Column, config: &VisualizerConfig) -> PanelPlan {
    match column.kind() {
        ColumnKind::Numeric => histogram_panel(column, false),
        ColumnKind::Temporal => histogram_panel(column, true),
        ColumnKind::Categorical => category_panel(column, config),
    }
}

fn histogram_panel(column: &Column, temporal: bool) -> PanelPlan {
    let values = column.data().numeric_values();
    let bins = histogram(&values, sturges_bins(values.len()));

    let y_scale = if value_range(&values) > LOG_RANGE_THRESHOLD {
        AxisScale::Log
    } else {
        AxisScale::Linear
    };
    // a log axis cannot show zero or negative values
    let all_positive = values.iter().all(|v| *v > 0.0);
    let x_scale = if !temporal && all_positive && skewness(&values).abs() > SKEWNESS_THRESHOLD {
        AxisScale::Log
    } else {
        AxisScale::Linear
    };

    let edges: Vec<f64> = bins.iter().flat_map(|b| [b.start, b.end]).collect();
    let counts: Vec<f64> = bins.iter().map(|b| b.count as f64).collect();
    let x_format = if temporal { TickFormat::Date } else { TickFormat::Number };

    PanelPlan {
        column: column.name().to_string(),
        title: format!("Distribution of {}", column.name()),
        x_label: Some(column.name().to_string()),
        y_label: Some("Count".to_string()),
        x_axis: Axis::continuous(x_scale, &edges, false, x_format),
        y_axis: Axis::continuous(y_scale, &counts, true, TickFormat::Number),
        rotate_x_labels: false,
        geometry: Geometry::Histogram { bins },
    }
}

fn category_panel(column: &Column, config: &VisualizerConfig) -> PanelPlan {
    let mut counts = value_counts(column.data());

    let title = if counts.len() > config.max_unique_labels {
        counts.truncate(config.max_unique_labels);
        format!("Top {} {}", config.max_unique_labels, column.name())
    } else {
        format!("Distribution of {}", column.name())
    };

    let (labels, heights): (Vec<String>, Vec<f64>) =
        counts.into_iter().map(|(label, n)| (label, n as f64)).unzip();

    let y_scale = if value_range(&heights) > LOG_RANGE_THRESHOLD {
        AxisScale::Log
    } else {
        AxisScale::Linear
    };
    let rotate_x_labels = labels
        .iter()
        .any(|l| l.chars().count() > config.max_label_length);

    PanelPlan {
        column: column.name().to_string(),
        title,
        x_label: Some(column.name().to_string()),
        y_label: Some("Count".to_string()),
        y_axis: Axis::continuous(y_scale, &heights, true, TickFormat::Number),
        x_axis: Axis::categorical(labels),
        rotate_x_labels,
        geometry: Geometry::Bars { counts: heights },
    }
}

/// Lower-triangle correlation heatmap over the numeric columns.
/// `None` with fewer than two rows or fewer than two numeric columns.
pub fn plan_correlation(dataset: &Dataset, config: &VisualizerConfig) -> Option<FigurePlan> {
    let numeric = dataset.columns_of_kind(ColumnKind::Numeric);
    if dataset.n_rows() < 2 || numeric.len() < 2 {
        return None;
    }

    let labels: Vec<String> = numeric.iter().map(|c| c.name().to_string()).collect();
    let data: Vec<_> = numeric.iter().map(|c| c.data()).collect();
    let values = correlation_matrix(&data);

    let n = labels.len();
    // upper triangle and diagonal are hidden
    let mask: Vec<Vec<bool>> = (0..n).map(|i| (0..n).map(|j| j >= i).collect()).collect();

    let center = 0.0;
    let visible = values
        .iter()
        .zip(&mask)
        .flat_map(|(row, mrow)| row.iter().zip(mrow).filter(|(_, m)| !**m).map(|(v, _)| *v))
        .filter(|v| v.is_finite());
    let limit = visible
        .map(|v| (v - center).abs())
        .fold(0.0_f64, f64::max);
    let limit = if limit > 0.0 { limit } else { 1.0 };

    let size = config.figure_size as f64;
    let panel = PanelPlan {
        column: String::new(),
        title: "Correlation matrix".to_string(),
        x_label: None,
        y_label: None,
        x_axis: Axis::categorical(labels.clone()),
        // first column at the top
        y_axis: Axis::categorical(labels.iter().rev().cloned().collect()),
        rotate_x_labels: labels.iter().any(|l| l.chars().count() > config.max_label_length),
        geometry: Geometry::Heatmap(HeatmapPlan {
            labels,
            values,
            mask,
            center,
            limit,
            colorbar_shrink: 0.5,
            line_width: 1,
        }),
    };

    Some(FigurePlan {
        kind: FigureKind::Correlation,
        width_units: size,
        height_units: size,
        grid: GridLayout::single(),
        cells: vec![Cell::Panel(Box::new(panel))],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnData;

    fn numeric(name: &str, values: &[f64]) -> Column {
        Column::new(name, ColumnData::Float(values.iter().map(|v| Some(*v)).collect()))
    }

    fn text(name: &str, values: &[&str]) -> Column {
        Column::new(
            name,
            ColumnData::Text(values.iter().map(|v| Some(v.to_string())).collect()),
        )
    }

    fn panel_at(figure: &FigurePlan, index: usize) -> &PanelPlan {
        match &figure.cells[index] {
            Cell::Panel(p) => &**p,
            other => panic!("Expected panel at {}, got {:?}", index, other),
        }
    }

    #[test]
    fn test_seven_numeric_columns() {
        let columns: Vec<Column> = (0..7).map(|i| numeric(&format!("c{}", i), &[1.0, 2.0, 3.0])).collect();
        let refs: Vec<&Column> = columns.iter().collect();
        let plan = plan_distributions(ColumnKind::Numeric, &refs, &VisualizerConfig::default()).unwrap();

        assert!(!plan.truncated);
        assert_eq!(plan.figure.grid, GridLayout { rows: 3, columns: 3 });
        assert_eq!(plan.figure.panels().count(), 7);
        assert_eq!(plan.figure.removed_count(), 2);
        assert!(matches!(plan.figure.cells[7], Cell::Removed));
        assert!(matches!(plan.figure.cells[8], Cell::Removed));
        assert_eq!((plan.figure.width_units, plan.figure.height_units), (15.0, 15.0));
        // bucket order is kept
        assert_eq!(panel_at(&plan.figure, 6).column, "c6");
    }

    #[test]
    fn test_empty_bucket_is_skipped() {
        assert!(plan_distributions(ColumnKind::Numeric, &[], &VisualizerConfig::default()).is_none());
    }

    #[test]
    fn test_plot_limit_keeps_first_columns() {
        let columns: Vec<Column> = (0..5).map(|i| numeric(&format!("c{}", i), &[1.0])).collect();
        let refs: Vec<&Column> = columns.iter().collect();
        let config = VisualizerConfig { max_plots: 2, ..Default::default() };
        let plan = plan_distributions(ColumnKind::Numeric, &refs, &config).unwrap();

        assert!(plan.truncated);
        let names: Vec<&str> = plan.figure.panels().map(|p| p.column.as_str()).collect();
        assert_eq!(names, vec!["c0", "c1"]);
        // 2 rows x 3: cells 2..4 stay empty, cell 5 is removed
        assert!(matches!(plan.figure.cells[2], Cell::Empty));
        assert!(matches!(plan.figure.cells[4], Cell::Empty));
        assert!(matches!(plan.figure.cells[5], Cell::Removed));
    }

    #[test]
    fn test_categories_within_limit() {
        let col = text("color", &["red", "blue", "red", "green"]);
        let panel = plan_panel(&col, &VisualizerConfig::default());
        assert_eq!(panel.title, "Distribution of color");
        match &panel.geometry {
            Geometry::Bars { counts } => assert_eq!(counts, &vec![2.0, 1.0, 1.0]),
            other => panic!("Expected bars, got {:?}", other),
        }
        assert_eq!(
            panel.x_axis.format,
            TickFormat::Category(vec!["red".into(), "blue".into(), "green".into()])
        );
    }

    #[test]
    fn test_categories_over_limit_show_top_k() {
        let mut values = Vec::new();
        for i in 0..12 {
            for _ in 0..(i + 1) {
                values.push(format!("v{}", i));
            }
        }
        let refs: Vec<&str> = values.iter().map(|s| s.as_str()).collect();
        let col = text("item", &refs);
        let config = VisualizerConfig { max_unique_labels: 4, ..Default::default() };
        let panel = plan_panel(&col, &config);

        assert_eq!(panel.title, "Top 4 item");
        match &panel.geometry {
            Geometry::Bars { counts } => assert_eq!(counts, &vec![12.0, 11.0, 10.0, 9.0]),
            other => panic!("Expected bars, got {:?}", other),
        }
        assert_eq!(
            panel.x_axis.format,
            TickFormat::Category(vec!["v11".into(), "v10".into(), "v9".into(), "v8".into()])
        );
    }

    #[test]
    fn test_long_labels_rotate_and_grow_figure_once() {
        let a = text("a", &["a very long label", "short"]);
        let b = text("b", &["another long label"]);
        let plan = plan_distributions(ColumnKind::Categorical, &[&a, &b], &VisualizerConfig::default()).unwrap();
        assert!(panel_at(&plan.figure, 0).rotate_x_labels);
        assert!(panel_at(&plan.figure, 1).rotate_x_labels);
        assert_eq!(plan.figure.height_units, 6.0);
    }

    #[test]
    fn test_short_labels_do_not_rotate() {
        let a = text("a", &["12345678", "x"]);
        let plan = plan_distributions(ColumnKind::Categorical, &[&a], &VisualizerConfig::default()).unwrap();
        assert!(!panel_at(&plan.figure, 0).rotate_x_labels);
        assert_eq!(plan.figure.height_units, 5.0);
    }

    #[test]
    fn test_category_count_range_triggers_log() {
        let mut values = vec!["common"; 1102];
        values.push("rare");
        let col = text("c", &values);
        let panel = plan_panel(&col, &VisualizerConfig::default());
        assert_eq!(panel.y_axis.scale, AxisScale::Log);

        let col = text("c", &["x", "x", "y"]);
        let panel = plan_panel(&col, &VisualizerConfig::default());
        assert_eq!(panel.y_axis.scale, AxisScale::Linear);
    }

    #[test]
    fn test_numeric_log_triggers() {
        let wide = numeric("wide", &[0.0, 500.0, 1000.5]);
        let panel = plan_panel(&wide, &VisualizerConfig::default());
        assert_eq!(panel.y_axis.scale, AxisScale::Log);
        assert_eq!(panel.x_axis.scale, AxisScale::Linear);

        let skewed = numeric("skewed", &[1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 50.0]);
        let panel = plan_panel(&skewed, &VisualizerConfig::default());
        assert_eq!(panel.x_axis.scale, AxisScale::Log);
        assert_eq!(panel.y_axis.scale, AxisScale::Linear);

        let narrow = numeric("narrow", &[1.0, 2.0, 3.0, 4.0]);
        let panel = plan_panel(&narrow, &VisualizerConfig::default());
        assert_eq!(panel.x_axis.scale, AxisScale::Linear);
        assert_eq!(panel.y_axis.scale, AxisScale::Linear);
        assert_eq!(panel.title, "Distribution of narrow");
    }

    #[test]
    fn test_skewed_non_positive_data_stays_linear() {
        let negative = numeric("loss", &[-1.0, -1.0, -1.0, -1.0, -2.0, -2.0, -3.0, -50.0]);
        let panel = plan_panel(&negative, &VisualizerConfig::default());
        assert_eq!(panel.x_axis.scale, AxisScale::Linear);

        let with_zero = numeric("wait", &[0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 50.0]);
        let panel = plan_panel(&with_zero, &VisualizerConfig::default());
        assert_eq!(panel.x_axis.scale, AxisScale::Linear);
    }

    #[test]
    fn test_temporal_never_log_x() {
        // 0, 1, 2, 3000 days: skewed and wide
        let dates = ["1970-01-01", "1970-01-02", "1970-01-03", "1978-03-20"];
        let col = Column::new(
            "when",
            ColumnData::Date(
                dates
                    .iter()
                    .map(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                    .collect(),
            ),
        );
        let panel = plan_panel(&col, &VisualizerConfig::default());
        assert_eq!(panel.x_axis.scale, AxisScale::Linear);
        assert_eq!(panel.y_axis.scale, AxisScale::Log);
        assert_eq!(panel.x_axis.format, TickFormat::Date);
    }

    #[test]
    fn test_all_missing_column_still_plans() {
        let col = Column::new("gone", ColumnData::Float(vec![None, None]));
        let panel = plan_panel(&col, &VisualizerConfig::default());
        match &panel.geometry {
            Geometry::Histogram { bins } => assert!(bins.is_empty()),
            other => panic!("Expected histogram, got {:?}", other),
        }
    }

    #[test]
    fn test_correlation_plan() {
        let ds = Dataset::new(vec![
            numeric("a", &[1.0, 2.0, 3.0]),
            text("t", &["x", "y", "z"]),
            numeric("b", &[2.0, 4.0, 7.0]),
            numeric("c", &[3.0, 2.0, 1.0]),
        ])
        .unwrap();
        let figure = plan_correlation(&ds, &VisualizerConfig::default()).unwrap();
        assert_eq!(figure.kind, FigureKind::Correlation);
        assert_eq!((figure.width_units, figure.height_units), (5.0, 5.0));

        let panel = panel_at(&figure, 0);
        assert_eq!(panel.title, "Correlation matrix");
        match &panel.geometry {
            Geometry::Heatmap(h) => {
                assert_eq!(h.labels, vec!["a", "b", "c"]);
                assert_eq!(
                    h.mask,
                    vec![
                        vec![true, true, true],
                        vec![false, true, true],
                        vec![false, false, true],
                    ]
                );
                assert_eq!(h.center, 0.0);
                assert!((h.limit - 1.0).abs() < 1e-9);
            }
            other => panic!("Expected heatmap, got {:?}", other),
        }
    }

    #[test]
    fn test_correlation_skipped_for_one_row() {
        let ds = Dataset::new(vec![numeric("a", &[1.0]), numeric("b", &[2.0])]).unwrap();
        assert!(plan_correlation(&ds, &VisualizerConfig::default()).is_none());
    }

    #[test]
    fn test_correlation_skipped_for_single_numeric_column() {
        let ds = Dataset::new(vec![numeric("a", &[1.0, 2.0, 3.0]), text("b", &["x", "y", "z"])]).unwrap();
        assert!(plan_correlation(&ds, &VisualizerConfig::default()).is_none());
    }

    #[test]
    fn test_correlation_skipped_without_numeric_columns() {
        let ds = Dataset::new(vec![text("a", &["x", "y"]), text("b", &["p", "q"])]).unwrap();
        assert!(plan_correlation(&ds, &VisualizerConfig::default()).is_none());
    }
}
