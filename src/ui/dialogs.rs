use egui::{Color32, Context, RichText, Window};

use crate::app::PlanboardApp;
use crate::model::{DurationDays, RiskLevel, TaskKind};
use crate::ui::theme;

/// Render the "Add Task" dialog.
///
/// The dialog edits a scratch copy of the draft and replaces the stored
/// draft wholesale when anything changed; the end date is derived from
/// start + duration on display, never typed in.
pub fn show_add_task_dialog(app: &mut PlanboardApp, ctx: &Context) {
    let mut should_close = false;
    let mut draft = app.draft.clone();

    Window::new(RichText::new("Add Task").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            egui::Grid::new("add_task_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [200.0, 24.0],
                        egui::TextEdit::singleline(&mut draft.name).hint_text("Task name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Type").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("dlg_kind")
                        .selected_text(draft.kind.label())
                        .show_ui(ui, |ui| {
                            for kind in [TaskKind::Project, TaskKind::Task, TaskKind::Milestone] {
                                ui.selectable_value(&mut draft.kind, kind, kind.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(
                        egui_extras::DatePickerButton::new(&mut draft.start).id_salt("dlg_dp_start"),
                    );
                    ui.end_row();

                    if draft.kind != TaskKind::Milestone {
                        ui.label(RichText::new("Duration").color(theme::TEXT_SECONDARY));
                        let mut days = draft.duration.days();
                        if ui
                            .add(egui::DragValue::new(&mut days).range(1..=3650).suffix(" days"))
                            .changed()
                        {
                            draft.duration = DurationDays::new(days);
                        }
                        ui.end_row();

                        // Derived, read-only; recomputed from the draft value.
                        ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                        ui.label(
                            RichText::new(draft.derived_end().format("%d/%m/%Y").to_string())
                                .color(theme::TEXT_DIM),
                        );
                        ui.end_row();
                    }

                    ui.label(RichText::new("Risk").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("dlg_risk")
                        .selected_text(draft.risk.label())
                        .show_ui(ui, |ui| {
                            for risk in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
                                ui.selectable_value(&mut draft.risk, risk, risk.label());
                            }
                        });
                    ui.end_row();

                    if draft.kind == TaskKind::Task {
                        ui.label(RichText::new("Stage").color(theme::TEXT_SECONDARY));
                        ui.add_sized(
                            [200.0, 22.0],
                            egui::TextEdit::singleline(&mut draft.stage).hint_text("optional"),
                        );
                        ui.end_row();
                    }
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let create_btn = egui::Button::new(RichText::new("Create").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], create_btn).clicked() {
                    app.draft = draft.clone();
                    app.add_task_from_draft();
                    should_close = true;
                }
                if ui
                    .add_sized([80.0, 28.0], egui::Button::new("Cancel"))
                    .clicked()
                {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if draft != app.draft && !should_close {
        app.draft = draft;
    }
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_add_task = false;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut PlanboardApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([260.0, 150.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Planboard").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("A project schedule planner");
                ui.label("built with Rust and egui.");
                ui.add_space(8.0);
                if ui.link("egui on GitHub").clicked() {
                    let _ = open::that("https://github.com/emilk/egui");
                }
                ui.add_space(10.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
