use std::collections::HashSet;

use egui::{Color32, RichText, Ui};

use crate::model::{Schedule, TaskKind};
use crate::ui::theme;

/// Actions that the task table can request.
pub enum TaskTableAction {
    None,
    Select(String),
    Delete(String),
    ToggleExpand(String),
    Add,
}

/// Render the left-side task table panel.
pub fn show_task_table(
    schedule: &Schedule,
    expanded: &HashSet<String>,
    selected: Option<&str>,
    ui: &mut Ui,
) -> TaskTableAction {
    let mut action = TaskTableAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Tasks")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(4.0);
        ui.label(
            RichText::new(format!("({})", schedule.iter_all().count()))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    });
    ui.add_space(4.0);

    let btn = egui::Button::new(RichText::new("＋  Add Task").color(Color32::WHITE).size(12.0))
        .fill(theme::ACCENT)
        .rounding(egui::Rounding::same(5.0));
    if ui.add_sized([ui.available_width(), 30.0], btn).clicked() {
        action = TaskTableAction::Add;
    }

    ui.add_space(6.0);
    ui.separator();
    ui.add_space(2.0);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, row) in schedule.visible_rows(expanded).iter().enumerate() {
                let task = row.task;
                let is_selected = selected == Some(task.id.as_str());

                let row_bg = if is_selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };

                let frame = egui::Frame {
                    fill: row_bg,
                    rounding: egui::Rounding::same(4.0),
                    inner_margin: egui::Margin::symmetric(6.0, 4.0),
                    outer_margin: egui::Margin::ZERO,
                    stroke: egui::Stroke::NONE,
                    shadow: egui::epaint::Shadow::NONE,
                };

                let frame_resp = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;
                        ui.add_space(f32::from(row.depth) * theme::SUBTASK_INDENT);

                        // Expand/collapse chevron for parents.
                        if task.has_subtasks() {
                            let chevron = if expanded.contains(&task.id) { "▾" } else { "▸" };
                            let toggle = ui.add(
                                egui::Button::new(
                                    RichText::new(chevron).size(11.0).color(theme::TEXT_SECONDARY),
                                )
                                .frame(false),
                            );
                            if toggle.clicked() {
                                action = TaskTableAction::ToggleExpand(task.id.clone());
                            }
                        } else {
                            ui.add_space(14.0);
                        }

                        // Risk dot
                        let (dot_rect, _) =
                            ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                        ui.painter()
                            .circle_filled(dot_rect.center(), 3.0, theme::risk_color(task.risk));

                        let name = if task.kind == TaskKind::Milestone {
                            format!("◆ {}", task.name)
                        } else {
                            task.name.clone()
                        };
                        let name_text = RichText::new(name).size(12.0).color(if is_selected {
                            Color32::WHITE
                        } else {
                            theme::TEXT_PRIMARY
                        });
                        ui.add(egui::Label::new(name_text).truncate());

                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                ui.spacing_mut().item_spacing.x = 4.0;

                                let del_btn = ui.add(
                                    egui::Button::new(
                                        RichText::new("✕").size(10.0).color(theme::TEXT_DIM),
                                    )
                                    .frame(false),
                                );
                                if del_btn.on_hover_text("Delete task").clicked() {
                                    action = TaskTableAction::Delete(task.id.clone());
                                }

                                let pbar = egui::ProgressBar::new(task.progress.fraction())
                                    .desired_width(44.0)
                                    .fill(theme::risk_color(task.risk))
                                    .rounding(egui::Rounding::same(3.0));
                                ui.add(pbar);

                                ui.label(
                                    RichText::new(task.planned.end.format("%d/%m").to_string())
                                        .size(10.0)
                                        .color(theme::TEXT_SECONDARY),
                                );
                                ui.label(RichText::new("→").size(9.0).color(theme::TEXT_DIM));
                                ui.label(
                                    RichText::new(task.planned.start.format("%d/%m").to_string())
                                        .size(10.0)
                                        .color(theme::TEXT_SECONDARY),
                                );
                            },
                        );
                    });
                });

                let row_rect = frame_resp.response.rect;
                let row_click = ui.interact(
                    row_rect,
                    egui::Id::new(("task-row", &task.id)),
                    egui::Sense::click(),
                );
                if row_click.clicked() {
                    action = TaskTableAction::Select(task.id.clone());
                }

                ui.add_space(1.0);
            }
        });

    action
}
