use std::collections::HashSet;

use egui::{Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use crate::model::{
    map_interval, DateInterval, Granularity, Row, Schedule, Task, TaskKind, TimeAxis,
};
use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// Result of interactions in the chart area.
#[derive(Debug, Clone, Default)]
pub struct ChartAction {
    pub select: Option<String>,
    pub clear_selection: bool,
}

/// Pixel width of one axis bucket column at each granularity.
fn column_width(granularity: Granularity) -> f32 {
    match granularity {
        Granularity::Day => 42.0,
        Granularity::Week => 96.0,
        Granularity::Month => 54.0,
        Granularity::Quarter => 84.0,
        Granularity::Year => 72.0,
    }
}

/// Render the timeline chart (central panel). The axis is built by the
/// caller once per frame; this function only consumes it.
pub fn show_chart(
    schedule: &Schedule,
    axis: &TimeAxis,
    expanded: &HashSet<String>,
    selected: Option<&str>,
    ui: &mut Ui,
) -> ChartAction {
    let mut action = ChartAction::default();

    if axis.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new("No scheduled tasks — add a task to see the timeline")
                    .color(theme::TEXT_DIM),
            );
        });
        return action;
    }

    let rows = schedule.visible_rows(expanded);
    let col_w = column_width(axis.granularity);
    let available = ui.available_size();
    let chart_width = (axis.len() as f32 * col_w).max(available.x);
    let chart_height = HEADER_HEIGHT + (rows.len() as f32 * (ROW_HEIGHT + ROW_PADDING)) + 40.0;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::click(),
            );
            let origin = response.rect.min;
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            draw_axis_header(&painter, origin, axis, col_w, chart_width, chart_height);
            draw_today_line(&painter, origin, axis, col_w, chart_height);

            // Alternating row backgrounds
            for (i, _row) in rows.iter().enumerate() {
                let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING);
                let row_bg = if i % 2 == 0 { theme::BG_PANEL } else { theme::BG_DARK };
                painter.rect_filled(
                    Rect::from_min_size(
                        Pos2::new(origin.x, y),
                        Vec2::new(chart_width, ROW_HEIGHT + ROW_PADDING),
                    ),
                    0.0,
                    row_bg,
                );
                painter.line_segment(
                    [
                        Pos2::new(origin.x, y + ROW_HEIGHT + ROW_PADDING),
                        Pos2::new(origin.x + chart_width, y + ROW_HEIGHT + ROW_PADDING),
                    ],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );
            }

            // Task bars: planned on top, actual below, both from the same axis.
            for (i, row) in rows.iter().enumerate() {
                let y = origin.y
                    + HEADER_HEIGHT
                    + i as f32 * (ROW_HEIGHT + ROW_PADDING)
                    + ROW_PADDING;
                let is_selected = selected == Some(row.task.id.as_str());

                let hit_rect = draw_row(&painter, origin, axis, col_w, row, y, is_selected);

                if let Some(hit_rect) = hit_rect {
                    let row_response = ui.interact(
                        hit_rect.expand(2.0),
                        ui.make_persistent_id(("chart-row", &row.task.id)),
                        Sense::click(),
                    );
                    if row_response.clicked() {
                        action.select = Some(row.task.id.clone());
                        consumed_click = true;
                    }
                    if row_response.hovered() {
                        show_row_tooltip(ui, row.task);
                    }
                }
            }

            if response.clicked() && !consumed_click {
                action.clear_selection = true;
            }
        });

    action
}

/// Draw both bars for one row. Returns the union rect used for hit testing,
/// or `None` when nothing mapped onto the axis at this zoom level.
fn draw_row(
    painter: &egui::Painter,
    origin: Pos2,
    axis: &TimeAxis,
    col_w: f32,
    row: &Row<'_>,
    y: f32,
    is_selected: bool,
) -> Option<Rect> {
    let task = row.task;

    if task.kind == TaskKind::Milestone {
        return map_interval(DateInterval::on(task.planned.start), axis)
            .map(|g| draw_milestone(painter, origin, col_w, g.start, task, y, is_selected));
    }

    let bar_h = (ROW_HEIGHT - 10.0) / 2.0;
    let mut hit: Option<Rect> = None;

    // Upper bar: planned interval, colored by risk.
    if let Some(geometry) = map_interval(task.planned, axis) {
        let rect = Rect::from_min_size(
            Pos2::new(origin.x + geometry.start as f32 * col_w, y + 3.0),
            Vec2::new(col_w * geometry.width_percent() / 100.0, bar_h),
        );
        let rounding = Rounding::same(theme::BAR_ROUNDING);
        painter.rect_filled(rect, rounding, theme::risk_color(task.risk));

        if task.progress.percent() > 0 {
            let progress_width = rect.width() * task.progress.fraction();
            let progress_rect = Rect::from_min_size(rect.min, Vec2::new(progress_width, rect.height()));
            painter.rect_filled(progress_rect, rounding, theme::PROGRESS_OVERLAY);

            // Progress divider tick
            if !task.progress.is_complete() {
                let tick_x = rect.left() + progress_width;
                painter.line_segment(
                    [
                        Pos2::new(tick_x, rect.top() + 1.5),
                        Pos2::new(tick_x, rect.bottom() - 1.5),
                    ],
                    Stroke::new(1.0, egui::Color32::from_white_alpha(60)),
                );
            }
        }

        if rect.width() > 40.0 {
            let galley =
                painter.layout_no_wrap(task.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
            let clipped = painter.with_clip_rect(rect);
            clipped.galley(
                Pos2::new(rect.left() + 5.0, rect.center().y - galley.size().y / 2.0),
                galley,
                egui::Color32::TRANSPARENT,
            );
        }
        hit = Some(rect);
    }

    // Lower bar: actual interval. Maps independently; a reversed or
    // unaligned actual simply leaves this half empty.
    if let Some(geometry) = map_interval(task.actual, axis) {
        let rect = Rect::from_min_size(
            Pos2::new(origin.x + geometry.start as f32 * col_w, y + bar_h + 5.0),
            Vec2::new(col_w * geometry.width_percent() / 100.0, bar_h),
        );
        painter.rect_filled(rect, Rounding::same(theme::BAR_ROUNDING), theme::ACTUAL_BAR);
        hit = Some(match hit {
            Some(existing) => existing.union(rect),
            None => rect,
        });
    }

    if is_selected {
        if let Some(rect) = hit {
            painter.rect_stroke(
                rect.expand(2.0),
                Rounding::same(theme::BAR_ROUNDING + 1.5),
                Stroke::new(2.0, theme::BORDER_ACCENT),
            );
        }
    }

    hit
}

fn draw_milestone(
    painter: &egui::Painter,
    origin: Pos2,
    col_w: f32,
    bucket: usize,
    task: &Task,
    y: f32,
    is_selected: bool,
) -> Rect {
    let center = Pos2::new(
        origin.x + bucket as f32 * col_w + col_w / 2.0,
        y + ROW_HEIGHT / 2.0,
    );
    let size = (ROW_HEIGHT / 2.0 - 4.0).max(6.0);

    let points = vec![
        Pos2::new(center.x, center.y - size),
        Pos2::new(center.x + size, center.y),
        Pos2::new(center.x, center.y + size),
        Pos2::new(center.x - size, center.y),
    ];
    painter.add(egui::Shape::convex_polygon(
        points.clone(),
        theme::MILESTONE,
        Stroke::NONE,
    ));
    if is_selected {
        painter.add(egui::Shape::convex_polygon(
            points,
            egui::Color32::TRANSPARENT,
            Stroke::new(2.0, theme::BORDER_ACCENT),
        ));
    }

    painter.text(
        Pos2::new(center.x + size + 6.0, center.y),
        egui::Align2::LEFT_CENTER,
        &task.name,
        theme::font_bar(),
        theme::TEXT_SECONDARY,
    );

    Rect::from_center_size(center, Vec2::splat(size * 2.0 + 2.0))
}

fn draw_axis_header(
    painter: &egui::Painter,
    origin: Pos2,
    axis: &TimeAxis,
    col_w: f32,
    width: f32,
    height: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    // Grouping headers (years), run-length encoded over the bucket row.
    let mut header_x = origin.x;
    for header in &axis.headers {
        let span_w = header.span as f32 * col_w;
        painter.text(
            Pos2::new(header_x + 4.0, origin.y + 12.0),
            egui::Align2::LEFT_CENTER,
            &header.label,
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
        painter.line_segment(
            [
                Pos2::new(header_x, origin.y),
                Pos2::new(header_x, origin.y + HEADER_HEIGHT),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        header_x += span_w;
    }

    // Bucket labels and grid lines.
    for (i, bucket) in axis.buckets.iter().enumerate() {
        let x = origin.x + i as f32 * col_w;
        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        painter.text(
            Pos2::new(x + 3.0, origin.y + 30.0),
            egui::Align2::LEFT_CENTER,
            &bucket.label,
            theme::font_sub(),
            theme::TEXT_SECONDARY,
        );
    }
}

fn draw_today_line(
    painter: &egui::Painter,
    origin: Pos2,
    axis: &TimeAxis,
    col_w: f32,
    height: f32,
) {
    let today = chrono::Local::now().date_naive();
    // Only drawn when today lands exactly on a bucket key (day zoom,
    // typically); coarser axes have no meaningful single-day position.
    let Some(index) = axis.position_of(today) else {
        return;
    };
    let x = origin.x + index as f32 * col_w + col_w / 2.0;

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        egui::Color32::WHITE,
    );
}

fn show_row_tooltip(ui: &Ui, task: &Task) {
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        egui::Id::new(("chart-tip", &task.id)),
        |ui| {
            ui.strong(format!("{}  {}", task.id, task.name));
            ui.label(format!(
                "Planned: {} → {}",
                task.planned.start.format("%d/%m/%Y"),
                task.planned.end.format("%d/%m/%Y"),
            ));
            ui.label(format!(
                "Actual: {} → {}",
                task.actual.start.format("%d/%m/%Y"),
                task.actual.end.format("%d/%m/%Y"),
            ));
            ui.label(format!(
                "Progress: {}%  ·  Risk: {}",
                task.progress.percent(),
                task.risk.label()
            ));
            if let Some(stage) = task.visible_stage() {
                ui.label(format!("Stage: {stage}"));
            }
        },
    );
}
