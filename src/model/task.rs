use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a schedule row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Project,
    Task,
    Milestone,
}

impl TaskKind {
    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Project => "Project",
            TaskKind::Task => "Task",
            TaskKind::Milestone => "Milestone",
        }
    }
}

/// Risk classification for a task. Closed set; anything unrecognized at an
/// input boundary falls back to `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Parse a user-supplied string (CSV import, editor). Unknown values
    /// map to `Low` rather than failing the row.
    pub fn parse_lenient(s: &str) -> RiskLevel {
        match s.trim().to_lowercase().as_str() {
            "high" | "critical" => RiskLevel::High,
            "medium" | "med" | "normal" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

/// Completion percentage, clamped to 0..=100 at construction. Render code
/// never clamps; by the time a value reaches the chart it is already valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16")]
pub struct Progress(u8);

impl Progress {
    pub fn new(percent: u16) -> Self {
        Progress(percent.min(100) as u8)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Fraction in 0.0..=1.0 for progress-bar widgets.
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }

    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl From<u16> for Progress {
    fn from(v: u16) -> Self {
        Progress::new(v)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Progress(0)
    }
}

/// Task length as a whole number of calendar days, minimum 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32")]
pub struct DurationDays(u32);

impl DurationDays {
    pub fn new(days: u32) -> Self {
        DurationDays(days.max(1))
    }

    pub fn days(self) -> u32 {
        self.0
    }

    /// End date of an interval of this length starting at `start`.
    /// A one-day task starts and ends on the same date.
    pub fn end_from(self, start: NaiveDate) -> NaiveDate {
        start + chrono::Duration::days(i64::from(self.0) - 1)
    }
}

impl From<u32> for DurationDays {
    fn from(v: u32) -> Self {
        DurationDays::new(v)
    }
}

impl Default for DurationDays {
    fn default() -> Self {
        DurationDays(1)
    }
}

/// A pair of calendar dates. `end < start` is representable (bad data entry)
/// and must be tolerated downstream; the bar mapper renders nothing for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Single-day interval.
    pub fn on(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn is_reversed(&self) -> bool {
        self.end < self.start
    }
}

/// A single schedule row: a project phase, a task, or a milestone.
/// Subtasks nest one level deep; the chart does not expand further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Dotted ordinal id, unique within its level ("2", "2.1").
    pub id: String,
    pub name: String,
    /// Baseline dates entered at planning time.
    pub planned: DateInterval,
    /// Dates as actually executed; diverges from `planned` as work slips.
    pub actual: DateInterval,
    pub duration: DurationDays,
    /// Id of the task this one depends on, shown as "none" when absent.
    pub depends_on: Option<String>,
    pub risk: RiskLevel,
    pub progress: Progress,
    pub kind: TaskKind,
    /// Phase label, displayed only for `kind == Task`.
    pub stage: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
}

impl Task {
    /// Create a task with sensible defaults for the non-date fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, planned: DateInterval) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            planned,
            actual: planned,
            duration: DurationDays::new(interval_days(planned)),
            depends_on: None,
            risk: RiskLevel::Low,
            progress: Progress::default(),
            kind: TaskKind::Task,
            stage: None,
            subtasks: Vec::new(),
        }
    }

    /// Create a milestone: a zero-duration marker anchored at `date`.
    pub fn new_milestone(id: impl Into<String>, name: impl Into<String>, date: NaiveDate) -> Self {
        let mut t = Task::new(id, name, DateInterval::on(date));
        t.kind = TaskKind::Milestone;
        t
    }

    /// Set completion, clamping out-of-range input here (the mutation point).
    pub fn set_progress(&mut self, percent: u16) {
        self.progress = Progress::new(percent);
    }

    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }

    /// The stage label is display-only and suppressed for non-leaf kinds.
    pub fn visible_stage(&self) -> Option<&str> {
        match self.kind {
            TaskKind::Task => self.stage.as_deref(),
            _ => None,
        }
    }
}

fn interval_days(interval: DateInterval) -> u32 {
    let days = (interval.end - interval.start).num_days() + 1;
    u32::try_from(days).unwrap_or(1)
}

/// Draft state for the add-task dialog. Edits replace the whole value;
/// the end date is derived on read, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub name: String,
    pub start: NaiveDate,
    pub duration: DurationDays,
    pub kind: TaskKind,
    pub risk: RiskLevel,
    pub stage: String,
}

impl TaskDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            start: today,
            duration: DurationDays::new(7),
            kind: TaskKind::Task,
            risk: RiskLevel::Low,
            stage: String::new(),
        }
    }

    /// Pure derivation of the end date from start + duration.
    pub fn derived_end(&self) -> NaiveDate {
        match self.kind {
            TaskKind::Milestone => self.start,
            _ => self.duration.end_from(self.start),
        }
    }

    /// Materialize the draft into a task with the given id.
    pub fn build(&self, id: String) -> Task {
        let name = if self.name.trim().is_empty() {
            "New Task".to_string()
        } else {
            self.name.trim().to_string()
        };
        let planned = DateInterval::new(self.start, self.derived_end());
        let mut task = Task::new(id, name, planned);
        task.kind = self.kind;
        task.risk = self.risk;
        task.duration = self.duration;
        if self.kind == TaskKind::Task && !self.stage.trim().is_empty() {
            task.stage = Some(self.stage.trim().to_string());
        }
        if self.kind == TaskKind::Milestone {
            task.duration = DurationDays::new(1);
        }
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn progress_clamps_at_construction() {
        assert_eq!(Progress::new(250).percent(), 100);
        assert_eq!(Progress::new(100).percent(), 100);
        assert_eq!(Progress::new(0).percent(), 0);
        assert_eq!(Progress::new(55).percent(), 55);
    }

    #[test]
    fn set_progress_clamps_at_mutation_point() {
        let mut task = Task::new("1", "t", DateInterval::on(date(2024, 11, 1)));
        task.set_progress(180);
        assert_eq!(task.progress.percent(), 100);
    }

    #[test]
    fn duration_has_floor_of_one_day() {
        assert_eq!(DurationDays::new(0).days(), 1);
        assert_eq!(DurationDays::new(0).end_from(date(2024, 11, 1)), date(2024, 11, 1));
    }

    #[test]
    fn duration_end_is_inclusive() {
        // A 10-day task starting Nov 1 runs through Nov 10.
        assert_eq!(DurationDays::new(10).end_from(date(2024, 11, 1)), date(2024, 11, 10));
    }

    #[test]
    fn duration_end_rolls_over_month_and_leap_day() {
        assert_eq!(DurationDays::new(3).end_from(date(2024, 2, 28)), date(2024, 3, 1));
        assert_eq!(DurationDays::new(3).end_from(date(2023, 2, 28)), date(2023, 3, 2));
    }

    #[test]
    fn draft_derives_end_from_start_and_duration() {
        let mut draft = TaskDraft::new(date(2024, 11, 1));
        draft.duration = DurationDays::new(10);
        assert_eq!(draft.derived_end(), date(2024, 11, 10));

        // Wholesale replacement with a new start recomputes the derivation.
        let moved = TaskDraft { start: date(2024, 12, 25), ..draft };
        assert_eq!(moved.derived_end(), date(2025, 1, 3));
    }

    #[test]
    fn milestone_draft_collapses_to_start() {
        let mut draft = TaskDraft::new(date(2024, 11, 5));
        draft.kind = TaskKind::Milestone;
        draft.duration = DurationDays::new(14);
        assert_eq!(draft.derived_end(), date(2024, 11, 5));

        let task = draft.build("3".into());
        assert_eq!(task.planned.start, task.planned.end);
        assert_eq!(task.duration.days(), 1);
    }

    #[test]
    fn stage_is_visible_only_for_plain_tasks() {
        let mut task = Task::new("1", "t", DateInterval::on(date(2024, 11, 1)));
        task.stage = Some("Design".into());
        assert_eq!(task.visible_stage(), Some("Design"));
        task.kind = TaskKind::Project;
        assert_eq!(task.visible_stage(), None);
    }

    #[test]
    fn reversed_interval_is_detected() {
        let interval = DateInterval::new(date(2024, 11, 10), date(2024, 11, 1));
        assert!(interval.is_reversed());
        assert!(!DateInterval::on(date(2024, 11, 1)).is_reversed());
    }

    #[test]
    fn risk_parses_leniently() {
        assert_eq!(RiskLevel::parse_lenient("HIGH"), RiskLevel::High);
        assert_eq!(RiskLevel::parse_lenient(" med "), RiskLevel::Medium);
        assert_eq!(RiskLevel::parse_lenient("whatever"), RiskLevel::Low);
    }
}
