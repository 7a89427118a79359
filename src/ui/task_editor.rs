use egui::{RichText, Ui};

use crate::model::{DateInterval, RiskLevel, Task, TaskKind};
use crate::ui::theme;

/// Actions the editor can request.
pub enum EditorAction {
    None,
    Changed,
    AddSubtask(String),
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(
        RichText::new(text)
            .size(10.0)
            .color(theme::TEXT_DIM)
            .strong(),
    );
}

/// Render an inline editor for the selected task.
pub fn show_task_editor(task: &mut Task, other_ids: &[String], ui: &mut Ui) -> EditorAction {
    let mut action = EditorAction::None;
    let mut changed = false;

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new(format!("Edit Task {}", task.id))
                .strong()
                .size(13.0)
                .color(theme::TEXT_PRIMARY),
        );
    });
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::same(8.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;
        ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;

        field_label(ui, "Name");
        let name_edit = ui.add_sized(
            [ui.available_width(), 24.0],
            egui::TextEdit::singleline(&mut task.name)
                .font(egui::FontId::proportional(12.0))
                .text_color(theme::TEXT_PRIMARY),
        );
        changed |= name_edit.changed();

        ui.add_space(2.0);

        field_label(ui, "Type");
        egui::ComboBox::from_id_salt("kind_combo")
            .selected_text(RichText::new(task.kind.label()).size(11.0))
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for kind in [TaskKind::Project, TaskKind::Task, TaskKind::Milestone] {
                    if ui
                        .selectable_value(&mut task.kind, kind, kind.label())
                        .clicked()
                    {
                        changed = true;
                    }
                }
            });
        if changed && task.kind == TaskKind::Milestone {
            // A milestone is a zero-duration marker; normalize here, at the
            // mutation point, not at render time.
            task.planned = DateInterval::on(task.planned.start);
            task.actual = DateInterval::on(task.actual.start);
        }

        field_label(ui, "Risk");
        egui::ComboBox::from_id_salt("risk_combo")
            .selected_text(RichText::new(task.risk.label()).size(11.0))
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for risk in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
                    if ui
                        .selectable_value(&mut task.risk, risk, risk.label())
                        .clicked()
                    {
                        changed = true;
                    }
                }
            });

        if task.kind == TaskKind::Task {
            field_label(ui, "Stage");
            let mut stage = task.stage.clone().unwrap_or_default();
            let stage_edit = ui.add_sized(
                [ui.available_width(), 22.0],
                egui::TextEdit::singleline(&mut stage).hint_text("e.g. Design Review"),
            );
            if stage_edit.changed() {
                task.stage = if stage.trim().is_empty() {
                    None
                } else {
                    Some(stage)
                };
                changed = true;
            }
        }

        ui.add_space(2.0);

        field_label(ui, "Planned");
        ui.horizontal(|ui| {
            let start = ui.add(
                egui_extras::DatePickerButton::new(&mut task.planned.start)
                    .id_salt("ed_planned_start"),
            );
            ui.label(RichText::new("→").color(theme::TEXT_DIM));
            let end = ui.add(
                egui_extras::DatePickerButton::new(&mut task.planned.end)
                    .id_salt("ed_planned_end"),
            );
            changed |= start.changed() || end.changed();
        });

        field_label(ui, "Actual");
        ui.horizontal(|ui| {
            let start = ui.add(
                egui_extras::DatePickerButton::new(&mut task.actual.start)
                    .id_salt("ed_actual_start"),
            );
            ui.label(RichText::new("→").color(theme::TEXT_DIM));
            let end = ui.add(
                egui_extras::DatePickerButton::new(&mut task.actual.end).id_salt("ed_actual_end"),
            );
            changed |= start.changed() || end.changed();
        });

        field_label(ui, "Progress");
        let mut percent = u16::from(task.progress.percent());
        let slider = ui.add(
            egui::Slider::new(&mut percent, 0..=100)
                .suffix("%")
                .trailing_fill(true),
        );
        if slider.changed() {
            task.set_progress(percent);
            changed = true;
        }

        field_label(ui, "Depends on");
        let current = task.depends_on.clone().unwrap_or_else(|| "none".to_string());
        egui::ComboBox::from_id_salt("depends_combo")
            .selected_text(RichText::new(&current).size(11.0))
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(task.depends_on.is_none(), "none")
                    .clicked()
                {
                    task.depends_on = None;
                    changed = true;
                }
                for id in other_ids {
                    if id == &task.id {
                        continue;
                    }
                    let is_current = task.depends_on.as_deref() == Some(id.as_str());
                    if ui.selectable_label(is_current, id.as_str()).clicked() {
                        task.depends_on = Some(id.clone());
                        changed = true;
                    }
                }
            });

        // Subtasks can only hang off root-level tasks; one nesting level.
        if !task.id.contains('.') {
            ui.add_space(4.0);
            if ui
                .button(RichText::new("＋ Add Subtask").size(11.0))
                .clicked()
            {
                action = EditorAction::AddSubtask(task.id.clone());
            }
        }
    });

    if changed && !matches!(action, EditorAction::AddSubtask(_)) {
        action = EditorAction::Changed;
    }
    action
}
