use egui::{menu, RichText, Ui};

use crate::app::PlanboardApp;
use crate::model::Granularity;
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut PlanboardApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_header()), |ui| {
            if ui.button("  New Schedule").clicked() {
                app.new_schedule();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_schedule();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_schedule();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_schedule_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import CSV...").clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button("  Export CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_header()), |ui| {
            ui.label(RichText::new("Timeline Scale").small().weak());
            for granularity in Granularity::ALL {
                if ui
                    .radio_value(&mut app.granularity, granularity, granularity.label())
                    .clicked()
                {
                    app.granularity_changed();
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("  Expand All").clicked() {
                app.expand_all();
                ui.close_menu();
            }
            if ui.button("  Collapse All").clicked() {
                app.collapse_all();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_header()), |ui| {
            if ui.button("  About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });
    });
}
