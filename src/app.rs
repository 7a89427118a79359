use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use log::warn;

use crate::config::AppSettings;
use crate::model::{
    DateInterval, Granularity, Progress, RiskLevel, Schedule, Task, TaskDraft, TaskKind, TimeAxis,
};
use crate::ui;

/// Main application state.
pub struct PlanboardApp {
    pub schedule: Schedule,
    /// Current timeline scale; the axis is rebuilt from it every frame.
    pub granularity: Granularity,
    /// Ids of root tasks currently showing their subtasks. Lives outside
    /// the task data and never mutates it.
    pub expanded: HashSet<String>,
    pub selected: Option<String>,
    pub file_path: Option<PathBuf>,

    // Dialog state
    pub show_add_task: bool,
    pub show_about: bool,
    pub draft: TaskDraft,

    pub status_message: String,

    settings: AppSettings,
    warned_empty_axis: bool,
}

impl PlanboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let today = chrono::Local::now().date_naive();

        // Reopen the last schedule when possible, otherwise start with the
        // demo data.
        let mut file_path = None;
        let schedule = match settings.last_file.as_deref() {
            Some(path) => match crate::io::load_schedule(path) {
                Ok(schedule) => {
                    file_path = Some(path.to_path_buf());
                    schedule
                }
                Err(e) => {
                    warn!("could not reopen {}: {e}", path.display());
                    Self::sample_schedule(today)
                }
            },
            None => Self::sample_schedule(today),
        };

        Self {
            schedule,
            granularity: settings.granularity,
            expanded: HashSet::new(),
            selected: None,
            file_path,
            show_add_task: false,
            show_about: false,
            draft: TaskDraft::new(today),
            status_message: "Ready".to_string(),
            settings,
            warned_empty_axis: false,
        }
    }

    /// Demo schedule shown on first launch. Built here, passed around as a
    /// value; nothing global.
    fn sample_schedule(today: NaiveDate) -> Schedule {
        let day = chrono::Duration::days;
        let mut schedule = Schedule::new("Sample Schedule");

        let mut phase1 = Task::new(
            "1",
            "Planning",
            DateInterval::new(today - day(10), today + day(4)),
        );
        phase1.kind = TaskKind::Project;
        phase1.progress = Progress::new(70);

        let mut kickoff = Task::new(
            "1.1",
            "Project Kickoff",
            DateInterval::new(today - day(10), today - day(7)),
        );
        kickoff.progress = Progress::new(100);
        kickoff.actual = DateInterval::new(today - day(10), today - day(6));
        kickoff.stage = Some("Initiation".to_string());

        let mut requirements = Task::new(
            "1.2",
            "Requirements Gathering",
            DateInterval::new(today - day(7), today + day(4)),
        );
        requirements.progress = Progress::new(60);
        requirements.risk = RiskLevel::Medium;
        requirements.depends_on = Some("1.1".to_string());
        requirements.actual = DateInterval::new(today - day(5), today + day(6));
        requirements.stage = Some("Analysis".to_string());

        phase1.subtasks = vec![kickoff, requirements];

        let mut phase2 = Task::new(
            "2",
            "Execution",
            DateInterval::new(today + day(4), today + day(32)),
        );
        phase2.kind = TaskKind::Project;
        phase2.depends_on = Some("1".to_string());

        let mut design = Task::new(
            "2.1",
            "UI Design",
            DateInterval::new(today + day(4), today + day(14)),
        );
        design.risk = RiskLevel::Medium;
        design.stage = Some("Design".to_string());

        let mut backend = Task::new(
            "2.2",
            "Backend Development",
            DateInterval::new(today + day(6), today + day(28)),
        );
        backend.risk = RiskLevel::High;
        backend.depends_on = Some("2.1".to_string());
        backend.stage = Some("Build".to_string());

        let mut qa = Task::new(
            "2.3",
            "Testing & QA",
            DateInterval::new(today + day(24), today + day(32)),
        );
        qa.depends_on = Some("2.2".to_string());
        qa.stage = Some("Verification".to_string());

        phase2.subtasks = vec![design, backend, qa];

        let launch = Task::new_milestone("3", "Launch", today + day(34));

        schedule.tasks = vec![phase1, phase2, launch];
        schedule
    }

    // --- File operations ---

    pub fn new_schedule(&mut self) {
        self.schedule = Schedule::default();
        self.file_path = None;
        self.selected = None;
        self.expanded.clear();
        self.status_message = "New schedule created".to_string();
    }

    pub fn open_schedule(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Planboard Schedule", &["plan.json", "json"])
            .pick_file()
        {
            match crate::io::load_schedule(&path) {
                Ok(schedule) => {
                    self.schedule = schedule;
                    self.file_path = Some(path.clone());
                    self.selected = None;
                    self.expanded.clear();
                    self.settings.last_file = Some(path);
                    self.settings.save();
                    self.status_message = "Schedule loaded".to_string();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {e}");
                }
            }
        }
    }

    pub fn save_schedule(&mut self) {
        if let Some(path) = self.file_path.clone() {
            match crate::io::save_schedule(&self.schedule, &path) {
                Ok(()) => self.status_message = "Schedule saved".to_string(),
                Err(e) => self.status_message = format!("Error saving: {e}"),
            }
        } else {
            self.save_schedule_as();
        }
    }

    pub fn save_schedule_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Planboard Schedule", &["plan.json", "json"])
            .set_file_name(format!("{}.plan.json", self.schedule.name))
            .save_file()
        {
            match crate::io::save_schedule(&self.schedule, &path) {
                Ok(()) => {
                    self.file_path = Some(path.clone());
                    self.settings.last_file = Some(path);
                    self.settings.save();
                    self.status_message = "Schedule saved".to_string();
                }
                Err(e) => self.status_message = format!("Error saving: {e}"),
            }
        }
    }

    pub fn import_csv(&mut self) {
        if !self.schedule.tasks.is_empty() {
            let confirm = rfd::MessageDialog::new()
                .set_title("Import CSV")
                .set_description("This will replace the current schedule. Continue?")
                .set_buttons(rfd::MessageButtons::YesNo)
                .show();
            if confirm != rfd::MessageDialogResult::Yes {
                return;
            }
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        {
            match crate::io::csv_import::import_csv(&path) {
                Ok((tasks, skipped)) => {
                    let name = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("Imported Schedule")
                        .to_string();
                    let count = tasks.len();
                    self.schedule = Schedule::new(name);
                    self.schedule.tasks = tasks;
                    self.file_path = None;
                    self.selected = None;
                    self.expanded.clear();
                    self.status_message = if skipped > 0 {
                        format!("Imported {count} tasks ({skipped} rows skipped)")
                    } else {
                        format!("Imported {count} tasks")
                    };
                }
                Err(e) => {
                    self.status_message = format!("CSV import failed: {e}");
                }
            }
        }
    }

    pub fn export_csv(&mut self) {
        if self.schedule.tasks.is_empty() {
            self.status_message = "Nothing to export — schedule has no tasks".to_string();
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(format!("{}.csv", self.schedule.name))
            .save_file()
        {
            match crate::io::csv_export::export_csv(&self.schedule.tasks, &path) {
                Ok(count) => {
                    self.status_message = format!("Exported {count} rows to CSV");
                }
                Err(e) => {
                    self.status_message = format!("CSV export failed: {e}");
                }
            }
        }
    }

    // --- Task operations ---

    pub fn add_task_from_draft(&mut self) {
        let id = self.schedule.next_root_id();
        let task = self.draft.build(id.clone());
        self.schedule.tasks.push(task);
        self.selected = Some(id);
        self.draft = TaskDraft::new(chrono::Local::now().date_naive());
        self.status_message = "Task added".to_string();
    }

    /// Add a subtask under the given root task and expand it.
    pub fn add_subtask(&mut self, parent_id: &str) {
        let Some(id) = self.schedule.next_child_id(parent_id) else {
            return;
        };
        let Some(parent) = self.schedule.find_mut(parent_id) else {
            return;
        };
        let sub = Task::new(id.clone(), "New Subtask", parent.planned);
        let parent_name = parent.name.clone();
        parent.subtasks.push(sub);
        self.expanded.insert(parent_id.to_string());
        self.selected = Some(id);
        self.status_message = format!("Added subtask under '{parent_name}'");
    }

    pub fn delete_task(&mut self, id: &str) {
        if self.schedule.remove(id) {
            if self
                .selected
                .as_deref()
                .is_some_and(|s| s == id || s.starts_with(&format!("{id}.")))
            {
                self.selected = None;
            }
            self.expanded.remove(id);
            self.status_message = "Task deleted".to_string();
        }
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn expand_all(&mut self) {
        self.expanded = self
            .schedule
            .tasks
            .iter()
            .filter(|t| t.has_subtasks())
            .map(|t| t.id.clone())
            .collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn granularity_changed(&mut self) {
        self.settings.granularity = self.granularity;
        self.settings.save();
    }
}

impl eframe::App for PlanboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S)) {
            self.save_schedule();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_small())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {}",
                                self.schedule.iter_all().count()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(" · ")
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(format!("Scale: {}", self.granularity.label()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: editor (when a task is selected) + task table
        let mut table_action = ui::task_table::TaskTableAction::None;
        let mut editor_action = ui::task_editor::EditorAction::None;
        egui::SidePanel::left("task_panel")
            .default_width(330.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                if let Some(sel_id) = self.selected.clone() {
                    let ids: Vec<String> =
                        self.schedule.iter_all().map(|t| t.id.clone()).collect();
                    if let Some(task) = self.schedule.find_mut(&sel_id) {
                        editor_action = ui::task_editor::show_task_editor(task, &ids, ui);
                    }
                    ui.add_space(4.0);
                    ui.separator();
                    ui.add_space(2.0);
                }

                table_action = ui::task_table::show_task_table(
                    &self.schedule,
                    &self.expanded,
                    self.selected.as_deref(),
                    ui,
                );
            });

        match table_action {
            ui::task_table::TaskTableAction::Select(id) => self.selected = Some(id),
            ui::task_table::TaskTableAction::Delete(id) => self.delete_task(&id),
            ui::task_table::TaskTableAction::ToggleExpand(id) => self.toggle_expanded(&id),
            ui::task_table::TaskTableAction::Add => self.show_add_task = true,
            ui::task_table::TaskTableAction::None => {}
        }
        match editor_action {
            ui::task_editor::EditorAction::Changed => {
                self.status_message = "Task updated".to_string();
            }
            ui::task_editor::EditorAction::AddSubtask(parent_id) => {
                self.add_subtask(&parent_id);
            }
            ui::task_editor::EditorAction::None => {}
        }

        // Central panel: timeline chart. The axis is rebuilt from the task
        // collection and the granularity on every frame; the chart only
        // consumes the finished result.
        let axis = match self.schedule.date_range() {
            Some((min, max)) => TimeAxis::build(min, max, self.granularity),
            None => TimeAxis::default(),
        };
        if axis.is_empty() && !self.schedule.tasks.is_empty() {
            if !self.warned_empty_axis {
                warn!("schedule has tasks but produced an empty axis; check task dates");
                self.warned_empty_axis = true;
            }
        } else {
            self.warned_empty_axis = false;
        }

        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            let action = ui::chart::show_chart(
                &self.schedule,
                &axis,
                &self.expanded,
                self.selected.as_deref(),
                ui,
            );
            if let Some(id) = action.select {
                if let Some(task) = self.schedule.find(&id) {
                    self.status_message = format!("Selected '{}'", task.name);
                }
                self.selected = Some(id);
            } else if action.clear_selection {
                self.selected = None;
            }
        });

        // Dialogs
        if self.show_add_task {
            ui::dialogs::show_add_task_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
