use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, Points};

use crate::color::{self, OVERLAY};
use crate::render::{BarSpec, BoxplotChart, Chart, Heatmap, HistogramChart, PairGrid, PairPanel};

const CHART_HEIGHT: f32 = 360.0;

/// Draw one chart artifact inline.
pub fn chart(ui: &mut Ui, chart: &Chart) {
    match chart {
        Chart::Heatmap(h) => heatmap(ui, h),
        Chart::PairGrid(g) => pair_grid(ui, g),
        Chart::Histogram(h) => histogram(ui, h),
        Chart::Boxplot(b) => boxplot(ui, b),
    }
}

fn bar_chart(bars: &[BarSpec], color: Color32) -> BarChart {
    let bars = bars
        .iter()
        .map(|b| Bar::new(b.center, b.height).width(b.width))
        .collect();
    BarChart::new(bars).color(color)
}

// ---------------------------------------------------------------------------
// Correlation heatmap (painted directly)
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, h: &Heatmap) {
    let n = h.labels.len();
    if n == 0 {
        return;
    }

    let label_w = 110.0;
    let label_h = 22.0;
    let legend_w = 60.0;
    let cell = ((ui.available_width() - label_w - legend_w) / n as f32).clamp(28.0, 80.0);
    let grid = cell * n as f32;

    let (response, painter) = ui.allocate_painter(
        Vec2::new(label_w + grid + legend_w, grid + label_h),
        Sense::hover(),
    );
    let origin = response.rect.min + Vec2::new(label_w, 0.0);
    let label_font = FontId::proportional(12.0);
    let cell_font = FontId::proportional((cell * 0.3).clamp(9.0, 14.0));

    for (i, row) in h.cells.iter().enumerate() {
        for (j, c) in row.iter().enumerate() {
            let min = origin + Vec2::new(j as f32 * cell, i as f32 * cell);
            let rect = Rect::from_min_size(min, Vec2::splat(cell));
            painter.rect_filled(rect.shrink(0.5), 0.0, c.fill);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                &c.annotation,
                cell_font.clone(),
                c.text_color,
            );
        }
    }

    let text_color = ui.visuals().text_color();
    for (i, label) in h.labels.iter().enumerate() {
        let y = origin.y + (i as f32 + 0.5) * cell;
        painter.text(
            Pos2::new(origin.x - 6.0, y),
            Align2::RIGHT_CENTER,
            label,
            label_font.clone(),
            text_color,
        );
        let x = origin.x + (i as f32 + 0.5) * cell;
        painter.text(
            Pos2::new(x, origin.y + grid + 4.0),
            Align2::CENTER_TOP,
            label,
            label_font.clone(),
            text_color,
        );
    }

    // Colour scale from -1 (bottom) to 1 (top).
    let strip_x = origin.x + grid + 12.0;
    let steps = 40;
    let step_h = grid / steps as f32;
    for s in 0..steps {
        let value = 1.0 - 2.0 * (s as f64 + 0.5) / steps as f64;
        let rect = Rect::from_min_size(
            Pos2::new(strip_x, origin.y + s as f32 * step_h),
            Vec2::new(14.0, step_h + 0.5),
        );
        painter.rect_filled(rect, 0.0, color::coolwarm(value));
    }
    for (value, y) in [(1.0, origin.y), (0.0, origin.y + grid / 2.0), (-1.0, origin.y + grid)] {
        painter.text(
            Pos2::new(strip_x + 18.0, y),
            Align2::LEFT_CENTER,
            format!("{value:.0}"),
            label_font.clone(),
            text_color,
        );
    }

    if let Some(pos) = response.hover_pos() {
        let rel = pos - origin;
        if rel.x >= 0.0 && rel.y >= 0.0 {
            let (j, i) = ((rel.x / cell) as usize, (rel.y / cell) as usize);
            if i < n && j < n {
                response.on_hover_text(format!(
                    "{} × {}: {:.4}",
                    h.labels[i], h.labels[j], h.cells[i][j].value
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pair grid
// ---------------------------------------------------------------------------

fn pair_grid(ui: &mut Ui, g: &PairGrid) {
    let n = g.columns.len();
    let size = (ui.available_width() / n as f32 - 8.0).clamp(120.0, 220.0);

    egui::Grid::new("pair_grid")
        .spacing(Vec2::splat(4.0))
        .show(ui, |ui: &mut Ui| {
            for (row, panels) in g.panels.iter().enumerate() {
                for (col, panel) in panels.iter().enumerate() {
                    let mut plot = Plot::new(("pair_panel", row, col))
                        .width(size)
                        .height(size)
                        .allow_drag(false)
                        .allow_zoom(false)
                        .allow_scroll(false)
                        .allow_boxed_zoom(false)
                        .show_x(false)
                        .show_y(false);
                    if row + 1 == n {
                        plot = plot.x_axis_label(&g.columns[col]);
                    }
                    if col == 0 {
                        plot = plot.y_axis_label(&g.columns[row]);
                    }
                    let color = g.colors[col];
                    plot.show(ui, |plot_ui| match panel {
                        PairPanel::Histogram(bars) => plot_ui.bar_chart(bar_chart(bars, color)),
                        PairPanel::Scatter(points) => plot_ui.points(
                            Points::new(points.clone()).radius(2.0).color(color),
                        ),
                    });
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Single-column charts
// ---------------------------------------------------------------------------

fn histogram(ui: &mut Ui, h: &HistogramChart) {
    Plot::new("histogram")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(&h.column)
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(bar_chart(&h.bars, h.color).name(&h.column));
            if !h.density.is_empty() {
                plot_ui.line(
                    Line::new(h.density.clone())
                        .name("KDE")
                        .color(OVERLAY)
                        .width(2.0),
                );
            }
        });
}

fn boxplot(ui: &mut Ui, b: &BoxplotChart) {
    let spread = BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker);
    let elem = BoxElem::new(0.0, spread)
        .name(&b.column)
        .box_width(0.5)
        .whisker_width(0.3)
        .fill(b.color.gamma_multiply(0.6))
        .stroke(Stroke::new(1.5, b.color));

    Plot::new("boxplot")
        .height(CHART_HEIGHT * 0.6)
        .x_axis_label(&b.column)
        .show_y(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]).horizontal());
            if !b.outliers.is_empty() {
                let points: Vec<[f64; 2]> = b.outliers.iter().map(|&x| [x, 0.0]).collect();
                plot_ui.points(
                    Points::new(points)
                        .radius(3.0)
                        .shape(egui_plot::MarkerShape::Diamond)
                        .color(b.color),
                );
            }
        });
}
