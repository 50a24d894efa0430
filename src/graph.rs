use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::ir::{Cell, FigurePlan, Geometry, HeatmapPlan, PanelPlan};
use crate::scale::{format_number, Axis, TickFormat};
use crate::theme::Style;
use crate::{OutputFormat, RenderOptions};

const TITLE_FONT_SIZE: i32 = 18;
const TICK_FONT_SIZE: i32 = 12;
const COLORBAR_STEPS: usize = 64;

/// Render a figure plan to encoded image bytes (PNG or SVG)
pub fn render_figure(plan: &FigurePlan, style: &Style, options: &RenderOptions) -> Result<Vec<u8>> {
    let (width, height) = options.pixel_size(plan.width_units, plan.height_units);

    match options.format {
        OutputFormat::Png => {
            let mut buffer = vec![0u8; rgb_buffer_len(width, height)];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (width, height))
                    .into_drawing_area();
                draw_figure(&root, plan, style)?;
                root.present().context("Failed to present drawing")?;
            }
            encode_png(&buffer, width, height)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
                draw_figure(&root, plan, style)?;
                root.present().context("Failed to present drawing")?;
            }
            Ok(svg.into_bytes())
        }
    }
}

/// Bytes in an RGB buffer; computed in `usize` so wide figures do not overflow `u32`
fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

/// Encode an RGB buffer as PNG
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

/// Draw every grid cell of a figure. Removed cells stay blank.
fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &FigurePlan,
    style: &Style,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&style.figure_background)
        .context("Failed to fill background")?;

    let areas = root.split_evenly((plan.grid.rows, plan.grid.columns));
    for (cell, area) in plan.cells.iter().zip(areas.iter()) {
        match cell {
            Cell::Removed => {}
            Cell::Empty => draw_empty_panel(area, style)?,
            Cell::Panel(panel) => match &panel.geometry {
                Geometry::Heatmap(heatmap) => draw_heatmap(area, panel, heatmap, style)?,
                _ => draw_panel(area, panel, style)?,
            },
        }
    }
    Ok(())
}

fn tick_style<'a>(style: &'a Style) -> TextStyle<'a> {
    (style.font_family.as_str(), TICK_FONT_SIZE)
        .into_font()
        .color(&style.text)
}

fn title_style<'a>(style: &'a Style) -> TextStyle<'a> {
    (style.font_family.as_str(), TITLE_FONT_SIZE)
        .into_font()
        .color(&style.text)
}

/// Histogram or bar chart panel
fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &PanelPlan,
    style: &Style,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (x0, x1) = panel.x_axis.domain;
    let (y0, y1) = panel.y_axis.domain;
    let x_label_area = if panel.rotate_x_labels { 90 } else { 45 };

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(&panel.title, title_style(style))
        .x_label_area_size(x_label_area)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .context("Failed to build chart")?;

    chart
        .plotting_area()
        .fill(&style.panel_background)
        .context("Failed to fill panel background")?;

    let x_fmt = |v: &f64| panel.x_axis.label(*v);
    let y_fmt = |v: &f64| panel.y_axis.label(*v);
    let x_tick_style = if panel.rotate_x_labels {
        tick_style(style).transform(FontTransform::Rotate90)
    } else {
        tick_style(style)
    };

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .x_label_style(x_tick_style)
            .y_label_style(tick_style(style))
            .axis_desc_style(tick_style(style))
            .axis_style(style.text.stroke_width(1))
            .max_light_lines(0);

        match style.grid {
            Some(grid) => {
                mesh.bold_line_style(grid.stroke_width(1));
            }
            None => {
                mesh.disable_mesh();
            }
        }
        if let TickFormat::Category(labels) = &panel.x_axis.format {
            mesh.x_labels(labels.len().max(1)).disable_x_mesh();
        }
        if let Some(label) = &panel.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &panel.y_label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw().context("Failed to draw mesh")?;
    }

    let bars = bar_rectangles(panel);
    let fill = style.bar_fill.filled();
    let edge = style.figure_background.stroke_width(1);

    chart
        .draw_series(bars.iter().map(|&(tl, br)| Rectangle::new([tl, br], fill)))
        .context("Failed to draw bars")?;
    chart
        .draw_series(bars.iter().map(|&(tl, br)| Rectangle::new([tl, br], edge)))
        .context("Failed to draw bar edges")?;

    Ok(())
}

/// Bar corners in drawing space. Bars with no extent on a log axis are dropped.
fn bar_rectangles(panel: &PanelPlan) -> Vec<((f64, f64), (f64, f64))> {
    let base = panel.y_axis.baseline();
    let to_x = |v: f64| clamped(&panel.x_axis, v);

    match &panel.geometry {
        Geometry::Histogram { bins } => bins
            .iter()
            .filter_map(|bin| {
                let top = panel.y_axis.scale.transform(bin.count as f64)?;
                let (left, right) = (to_x(bin.start), to_x(bin.end));
                (right > left).then_some(((left, top), (right, base)))
            })
            .collect(),
        Geometry::Bars { counts } => counts
            .iter()
            .enumerate()
            .filter_map(|(idx, &count)| {
                let top = panel.y_axis.scale.transform(count)?;
                let center = idx as f64;
                Some(((center - 0.4, top), (center + 0.4, base)))
            })
            .collect(),
        Geometry::Heatmap(_) => Vec::new(),
    }
}

/// Transform onto an axis, pinning values a log axis cannot show to its lower edge
fn clamped(axis: &Axis, value: f64) -> f64 {
    axis.scale
        .transform(value)
        .unwrap_or(axis.domain.0)
        .clamp(axis.domain.0, axis.domain.1)
}

/// A grid cell that is part of the layout but has no plot
fn draw_empty_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, style: &Style) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .context("Failed to build chart")?;

    chart
        .plotting_area()
        .fill(&style.panel_background)
        .context("Failed to fill panel background")?;

    let mut mesh = chart.configure_mesh();
    mesh.y_label_style(tick_style(style))
        .x_label_style(tick_style(style))
        .max_light_lines(0);
    match style.grid {
        Some(grid) => {
            mesh.bold_line_style(grid.stroke_width(1));
        }
        None => {
            mesh.disable_mesh();
        }
    }
    mesh.draw().context("Failed to draw mesh")?;
    Ok(())
}

/// Lower-triangle heatmap with a color bar on the right
fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &PanelPlan,
    heatmap: &HeatmapPlan,
    style: &Style,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let n = heatmap.labels.len();
    let (width, height) = area.dim_in_pixel();
    let main_width = (width as f64 * 0.82) as u32;
    let (main, side) = area.split_horizontally(main_width);

    // square cells: center a square region in the main area
    let edge = main_width.min(height);
    let square = main.shrink(((main_width - edge) / 2, (height - edge) / 2), (edge, edge));

    let x_label_area = if panel.rotate_x_labels { 90 } else { 45 };
    let mut chart = ChartBuilder::on(&square)
        .margin(10)
        .caption(&panel.title, title_style(style))
        .x_label_area_size(x_label_area)
        .y_label_area_size(70)
        .build_cartesian_2d(
            panel.x_axis.domain.0..panel.x_axis.domain.1,
            panel.y_axis.domain.0..panel.y_axis.domain.1,
        )
        .context("Failed to build chart")?;

    let x_fmt = |v: &f64| panel.x_axis.label(*v);
    let y_fmt = |v: &f64| panel.y_axis.label(*v);
    let x_tick_style = if panel.rotate_x_labels {
        tick_style(style).transform(FontTransform::Rotate90)
    } else {
        tick_style(style)
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n.max(1))
        .y_labels(n.max(1))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_label_style(x_tick_style)
        .y_label_style(tick_style(style))
        .axis_style(style.figure_background.stroke_width(0))
        .draw()
        .context("Failed to draw mesh")?;

    // row i of the matrix sits at y = n - 1 - i so the first column reads top-down
    let cells: Vec<((f64, f64), (f64, f64), RGBColor)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .filter(|&(i, j)| !heatmap.mask[i][j] && heatmap.values[i][j].is_finite())
        .map(|(i, j)| {
            let x = j as f64;
            let y = (n - 1 - i) as f64;
            let color = style
                .diverging
                .color(heatmap.values[i][j], heatmap.center, heatmap.limit);
            ((x - 0.5, y + 0.5), (x + 0.5, y - 0.5), color)
        })
        .collect();

    chart
        .draw_series(cells.iter().map(|&(tl, br, color)| Rectangle::new([tl, br], color.filled())))
        .context("Failed to draw heatmap cells")?;
    chart
        .draw_series(cells.iter().map(|&(tl, br, _)| {
            Rectangle::new([tl, br], style.figure_background.stroke_width(heatmap.line_width))
        }))
        .context("Failed to draw heatmap cell borders")?;

    draw_colorbar(&side, heatmap, style)
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    heatmap: &HeatmapPlan,
    style: &Style,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (width, height) = area.dim_in_pixel();
    let bar_height = ((height as f64 * heatmap.colorbar_shrink) as u32).max(1);
    let top = (height - bar_height.min(height)) / 2;
    let bar_area = area.clone().shrink((0u32, top), (width, bar_height));

    let low = heatmap.center - heatmap.limit;
    let high = heatmap.center + heatmap.limit;

    let mut chart = ChartBuilder::on(&bar_area)
        .margin_right(5)
        .right_y_label_area_size(45)
        .build_cartesian_2d(0.0..1.0, low..high)
        .context("Failed to build color bar")?;

    let fmt = |v: &f64| format_number(*v);
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&fmt)
        .y_label_style(tick_style(style))
        .draw()
        .context("Failed to draw color bar axis")?;

    let step = (high - low) / COLORBAR_STEPS as f64;
    chart
        .draw_series((0..COLORBAR_STEPS).map(|k| {
            let v0 = low + k as f64 * step;
            let color = style
                .diverging
                .color(v0 + step / 2.0, heatmap.center, heatmap.limit);
            Rectangle::new([(0.0, v0 + step), (1.0, v0)], color.filled())
        }))
        .context("Failed to draw color bar")?;

    Ok(())
}
