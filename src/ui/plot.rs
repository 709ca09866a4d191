use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Legend, Line, Plot, PlotPoints};

use melodymetrics::data::charts::{self, BarOfPie, Chart, LineChart, OTHERS};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Chart view (central panel)
// ---------------------------------------------------------------------------

/// Render a chart description in the central panel.
pub fn chart_view(ui: &mut Ui, chart: &Chart, colors: &ColorMap) {
    match chart {
        Chart::Bar(bar) => bar_plot(ui, bar, colors),
        Chart::BarOfPie(pie) => bar_of_pie(ui, pie, colors),
        Chart::Line(line) => line_plot(ui, line, colors),
    }
}

/// One bar per category, laid out at x = 0, 1, 2, ... with the category
/// names as tick labels.
fn bar_plot(ui: &mut Ui, chart: &charts::BarChart, colors: &ColorMap) {
    ui.heading(&chart.title);

    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            Bar::new(i as f64, *count as f64)
                .name(label)
                .fill(colors.color_for(label))
                .width(0.8)
        })
        .collect();

    let names: Vec<String> = chart.bars.iter().map(|(label, _)| label.clone()).collect();

    Plot::new("bar_plot")
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&chart.y_label));
        });
}

/// Pie of the leading main genres with the `Others` slice pulled out, next
/// to a stacked bar breaking `Others` down.
fn bar_of_pie(ui: &mut Ui, chart: &BarOfPie, colors: &ColorMap) {
    ui.heading(&chart.title);

    ui.columns(2, |cols| {
        pie(&mut cols[0], &chart.slices, colors);
        others_bar(&mut cols[1], &chart.others, colors);
    });
}

fn pie(ui: &mut Ui, slices: &[(String, usize)], colors: &ColorMap) {
    let total: usize = slices.iter().map(|(_, n)| n).sum();
    if total == 0 {
        ui.label("No genres to show.");
        return;
    }

    let size = Vec2::splat(ui.available_width().min(ui.available_height()));
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let radius = rect.width().min(rect.height()) * 0.4;
    let text_color = ui.visuals().text_color();

    let mut start = -FRAC_PI_2;
    for (label, count) in slices {
        let share = *count as f32 / total as f32;
        let sweep = share * TAU;
        let mid = start + sweep / 2.0;
        let direction = Vec2::angled(mid);

        let mut center = rect.center();
        if label == OTHERS {
            center += direction * radius * 0.1;
        }

        let color = colors.color_for(label);
        for (from, to) in arc_segments(start, sweep) {
            painter.add(slice_segment(center, radius, from, to, color));
        }
        painter.text(
            center + direction * radius * 0.65,
            Align2::CENTER_CENTER,
            format!("{label}\n{:.1}%", share * 100.0),
            FontId::proportional(12.0),
            text_color,
        );
        start += sweep;
    }
}

/// Split an arc into pieces of at most a quarter turn so each piece, closed
/// at the center, is a convex polygon.
fn arc_segments(start: f32, sweep: f32) -> Vec<(f32, f32)> {
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / pieces as f32;
    (0..pieces)
        .map(|i| (start + step * i as f32, start + step * (i + 1) as f32))
        .collect()
}

fn slice_segment(center: Pos2, radius: f32, from: f32, to: f32, color: Color32) -> Shape {
    const STEPS: usize = 16;
    let mut points = Vec::with_capacity(STEPS + 2);
    points.push(center);
    for i in 0..=STEPS {
        let angle = from + (to - from) * i as f32 / STEPS as f32;
        points.push(center + Vec2::angled(angle) * radius);
    }
    Shape::convex_polygon(points, color, Stroke::new(1.0, color))
}

/// Stacked bar of the genres folded into `Others`, as percentages of it.
fn others_bar(ui: &mut Ui, others: &[(String, usize)], colors: &ColorMap) {
    let total: usize = others.iter().map(|(_, n)| n).sum();
    if total == 0 {
        ui.label("No other genres.");
        return;
    }

    Plot::new("others_bar")
        .legend(Legend::default())
        .y_axis_label("% of Others")
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut bottom = 0.0;
            for (label, count) in others {
                let share = *count as f64 / total as f64 * 100.0;
                let color = colors.color_for(label);
                let bar = Bar::new(0.0, share)
                    .base_offset(bottom)
                    .fill(color)
                    .name(label)
                    .width(0.4);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(label).color(color));
                bottom += share;
            }
        });
}

/// One line per series over the years.
fn line_plot(ui: &mut Ui, chart: &LineChart, colors: &ColorMap) {
    ui.heading(&chart.title);

    Plot::new("line_plot")
        .legend(Legend::default())
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series
                    .points
                    .iter()
                    .map(|&(year, count)| [year as f64, count as f64])
                    .collect();
                let line = Line::new(points)
                    .name(&series.name)
                    .color(colors.color_for(&series.name))
                    .width(2.0);
                plot_ui.line(line);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcs_split_into_quarter_turns() {
        let segments = arc_segments(0.0, TAU * 0.6);
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|(a, b)| b - a <= FRAC_PI_2 + 1e-6));
        assert!((segments[2].1 - TAU * 0.6).abs() < 1e-5);
    }

    #[test]
    fn small_arcs_stay_whole() {
        let segments = arc_segments(1.0, 0.2);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].0, 1.0);
    }
}
