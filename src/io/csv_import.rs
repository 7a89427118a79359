use std::path::Path;

use chrono::NaiveDate;
use log::warn;
use thiserror::Error;

use crate::model::{DateInterval, Progress, RiskLevel, Task, TaskKind};

/// Failures that abort an import entirely. Per-row problems are logged and
/// counted as skips instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to read CSV headers: {0}")]
    Headers(#[from] csv::Error),
    #[error(
        "CSV is missing required columns (need: task name, planned start, planned end); \
         found headers: {0:?}"
    )]
    MissingColumns(Vec<String>),
    #[error("CSV file is empty or has no valid data rows ({0} rows skipped)")]
    NoTasks(usize),
}

/// Canonical columns an import can map headers onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Col {
    Name,
    PlannedStart,
    PlannedEnd,
    ActualStart,
    ActualEnd,
    Progress,
    Risk,
    Stage,
    Kind,
    Parent,
    DependsOn,
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Percentage field: accepts "60", "60%", "60.5". Clamping to 0..=100
/// happens in `Progress::new`, the validation boundary.
fn parse_progress(s: &str) -> Option<Progress> {
    let cleaned = s.trim().trim_end_matches('%').trim();
    let value: f64 = cleaned.parse().ok()?;
    Some(Progress::new(value.max(0.0).round() as u16))
}

fn parse_kind(s: &str) -> TaskKind {
    match s.trim().to_lowercase().as_str() {
        "project" | "phase" | "group" => TaskKind::Project,
        "milestone" => TaskKind::Milestone,
        _ => TaskKind::Task,
    }
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_col(normalized: &str) -> Option<Col> {
    match normalized {
        "name" | "task" | "taskname" | "label" | "title" | "activity" => Some(Col::Name),

        "plannedstart" | "start" | "startdate" | "from" | "begin" => Some(Col::PlannedStart),

        "plannedend" | "end" | "enddate" | "to" | "finish" | "due" | "duedate" => {
            Some(Col::PlannedEnd)
        }

        "actualstart" | "realstart" => Some(Col::ActualStart),

        "actualend" | "realend" => Some(Col::ActualEnd),

        "progress" | "done" | "complete" | "completion" | "percent" => Some(Col::Progress),

        "risk" | "risklevel" => Some(Col::Risk),

        "stage" | "phase" => Some(Col::Stage),

        "type" | "kind" => Some(Col::Kind),

        "parent" | "parenttask" | "parentname" | "subtaskof" => Some(Col::Parent),

        "dependson" | "depends" | "dependency" | "predecessor" => Some(Col::DependsOn),

        _ => None,
    }
}

/// One CSV row, parsed but not yet placed into the task tree.
struct ParsedRow {
    task: Task,
    parent: Option<String>,
    depends_on: Option<String>,
}

/// Import tasks from a CSV file.
///
/// Auto-detects the delimiter (comma, semicolon, tab) and matches column
/// headers flexibly ("Planned Start", "planned_start", ...). Rows with a
/// missing name or unparseable planned dates are skipped with a warning.
/// Returns `(tasks, skipped_count)`.
pub fn import_csv(path: &Path) -> Result<(Vec<Task>, usize), ImportError> {
    let content = std::fs::read_to_string(path)?;
    import_csv_str(&content)
}

/// The actual importer, split off from the file wrapper so it can run on
/// in-memory input.
pub fn import_csv_str(content: &str) -> Result<(Vec<Task>, usize), ImportError> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<Col>> = headers
        .iter()
        .map(|h| header_to_col(&normalize_header(h)))
        .collect();

    let has = |col: Col| col_map.iter().any(|c| *c == Some(col));
    if !has(Col::Name) || !has(Col::PlannedStart) || !has(Col::PlannedEnd) {
        return Err(ImportError::MissingColumns(
            headers.iter().map(str::to_string).collect(),
        ));
    }

    let mut rows: Vec<ParsedRow> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping CSV row {line}: {e}");
                skipped += 1;
                continue;
            }
        };

        let field = |col: Col| -> Option<String> {
            record
                .iter()
                .zip(col_map.iter())
                .find(|(_, c)| **c == Some(col))
                .map(|(v, _)| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let name = match field(Col::Name) {
            Some(n) => n,
            None => {
                skipped += 1;
                continue;
            }
        };

        let planned_start = field(Col::PlannedStart).as_deref().and_then(parse_date);
        let planned_end = field(Col::PlannedEnd).as_deref().and_then(parse_date);
        let (start, end) = match (planned_start, planned_end) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                warn!("skipping row {line} ('{name}'): invalid planned dates");
                skipped += 1;
                continue;
            }
        };

        // Ids are assigned after parenting is known; placeholder for now.
        let mut task = Task::new(String::new(), name, DateInterval::new(start, end));

        // Actual dates default to planned when absent; a present-but-bad
        // value degrades the same way.
        let actual_start = field(Col::ActualStart).as_deref().and_then(parse_date);
        let actual_end = field(Col::ActualEnd).as_deref().and_then(parse_date);
        task.actual = DateInterval::new(actual_start.unwrap_or(start), actual_end.unwrap_or(end));

        if let Some(p) = field(Col::Progress).as_deref().and_then(parse_progress) {
            task.progress = p;
        }
        if let Some(r) = field(Col::Risk) {
            task.risk = RiskLevel::parse_lenient(&r);
        }
        if let Some(k) = field(Col::Kind) {
            task.kind = parse_kind(&k);
        }
        task.stage = field(Col::Stage);
        if task.kind == TaskKind::Milestone {
            task.planned = DateInterval::on(task.planned.start);
            task.actual = DateInterval::on(task.actual.start);
        }

        rows.push(ParsedRow {
            task,
            parent: field(Col::Parent),
            depends_on: field(Col::DependsOn),
        });
    }

    if rows.is_empty() {
        return Err(ImportError::NoTasks(skipped));
    }

    Ok((assemble_tree(rows), skipped))
}

/// Second pass: nest rows under their named parents and hand out dotted
/// ordinal ids in file order. An unknown parent name demotes the row to a
/// root task rather than dropping it.
fn assemble_tree(rows: Vec<ParsedRow>) -> Vec<Task> {
    let mut roots: Vec<Task> = Vec::new();

    for ParsedRow { mut task, parent, depends_on } in rows {
        task.depends_on = depends_on;
        let parent = parent.and_then(|name| {
            let found = roots.iter().position(|t| t.name.eq_ignore_ascii_case(&name));
            if found.is_none() {
                warn!("parent task '{name}' not found for '{}'; importing at root level", task.name);
            }
            found
        });
        match parent {
            Some(idx) => {
                let parent = &mut roots[idx];
                task.id = format!("{}.{}", parent.id, parent.subtasks.len() + 1);
                parent.subtasks.push(task);
            }
            None => {
                task.id = (roots.len() + 1).to_string();
                roots.push(task);
            }
        }
    }

    // Dependency references were written as names; rewrite them to ids.
    let name_to_id: Vec<(String, String)> = roots
        .iter()
        .flat_map(|t| std::iter::once(t).chain(t.subtasks.iter()))
        .map(|t| (t.name.to_lowercase(), t.id.clone()))
        .collect();
    let resolve = |dep: &mut Option<String>| {
        if let Some(raw) = dep.take() {
            let lowered = raw.to_lowercase();
            match name_to_id.iter().find(|(n, id)| *n == lowered || *id == raw) {
                Some((_, id)) => *dep = Some(id.clone()),
                None => warn!("dependency '{raw}' not found; clearing reference"),
            }
        }
    };
    for task in &mut roots {
        resolve(&mut task.depends_on);
        for sub in &mut task.subtasks {
            resolve(&mut sub.depends_on);
        }
    }

    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn imports_semicolon_delimited_with_flexible_headers() {
        let csv = "Task Name;Planned Start;Planned End;Risk;Progress\n\
                   Phase 1;01/11/2024;20/11/2024;High;60%\n\
                   Launch;2024-12-01;2024-12-01;low;0\n";
        let (tasks, skipped) = import_csv_str(csv).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "1");
        assert_eq!(tasks[0].planned.start, date(2024, 11, 1));
        assert_eq!(tasks[0].risk, RiskLevel::High);
        assert_eq!(tasks[0].progress.percent(), 60);
        assert_eq!(tasks[1].planned.end, date(2024, 12, 1));
    }

    #[test]
    fn nests_subtasks_under_named_parents_with_dotted_ids() {
        let csv = "Name,Start,End,Parent\n\
                   Phase 1,2024-11-01,2024-11-20,\n\
                   Kickoff,2024-11-01,2024-11-05,Phase 1\n\
                   Build,2024-11-06,2024-11-20,Phase 1\n";
        let (tasks, _) = import_csv_str(csv).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].subtasks.len(), 2);
        assert_eq!(tasks[0].subtasks[0].id, "1.1");
        assert_eq!(tasks[0].subtasks[1].id, "1.2");
    }

    #[test]
    fn unknown_parent_demotes_row_to_root() {
        let csv = "Name,Start,End,Parent\n\
                   Orphan,2024-11-01,2024-11-05,Ghost Phase\n";
        let (tasks, skipped) = import_csv_str(csv).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "1");
    }

    #[test]
    fn rows_with_bad_dates_are_skipped_not_fatal() {
        let csv = "Name,Start,End\n\
                   Good,2024-11-01,2024-11-05\n\
                   Bad,not-a-date,2024-11-05\n";
        let (tasks, skipped) = import_csv_str(csv).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn missing_required_columns_is_an_error() {
        let csv = "Name,Start\nA,2024-11-01\n";
        assert!(matches!(
            import_csv_str(csv),
            Err(ImportError::MissingColumns(_))
        ));
    }

    #[test]
    fn out_of_range_progress_is_clamped_at_the_boundary() {
        let csv = "Name,Start,End,Progress\n\
                   Over,2024-11-01,2024-11-05,150\n";
        let (tasks, _) = import_csv_str(csv).unwrap();
        assert_eq!(tasks[0].progress.percent(), 100);
    }

    #[test]
    fn dependencies_resolve_by_name_to_ids() {
        let csv = "Name,Start,End,Depends\n\
                   Design,2024-11-01,2024-11-05,\n\
                   Build,2024-11-06,2024-11-20,Design\n";
        let (tasks, _) = import_csv_str(csv).unwrap();
        assert_eq!(tasks[1].depends_on.as_deref(), Some("1"));
    }

    #[test]
    fn milestone_kind_collapses_to_a_single_day() {
        let csv = "Name,Start,End,Type\n\
                   Ship,2024-12-01,2024-12-15,Milestone\n";
        let (tasks, _) = import_csv_str(csv).unwrap();
        assert_eq!(tasks[0].kind, TaskKind::Milestone);
        assert_eq!(tasks[0].planned.end, date(2024, 12, 1));
    }

    #[test]
    fn actual_dates_default_to_planned_when_absent() {
        let csv = "Name,Start,End,Actual Start,Actual End\n\
                   Slipped,2024-11-01,2024-11-05,2024-11-03,2024-11-09\n\
                   OnPlan,2024-11-01,2024-11-05,,\n";
        let (tasks, _) = import_csv_str(csv).unwrap();
        assert_eq!(tasks[0].actual.start, date(2024, 11, 3));
        assert_eq!(tasks[0].actual.end, date(2024, 11, 9));
        assert_eq!(tasks[1].actual, tasks[1].planned);
    }
}
