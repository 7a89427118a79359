use std::path::Path;

use thiserror::Error;

use crate::model::Task;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Export tasks to a semicolon-delimited CSV file matching the import
/// format. Subtasks are flattened under their parents with dotted ids.
/// Dates are formatted as DD/MM/YYYY. Returns the number of rows written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record([
        "Id",
        "Name",
        "Planned Start",
        "Planned End",
        "Actual Start",
        "Actual End",
        "Progress",
        "Risk",
        "Type",
        "Stage",
        "Depends On",
    ])?;

    let mut written = 0usize;
    for task in tasks {
        write_row(&mut wtr, task)?;
        written += 1;
        for sub in &task.subtasks {
            write_row(&mut wtr, sub)?;
            written += 1;
        }
    }

    wtr.flush()?;
    Ok(written)
}

fn write_row<W: std::io::Write>(wtr: &mut csv::Writer<W>, task: &Task) -> Result<(), csv::Error> {
    wtr.write_record([
        task.id.as_str(),
        task.name.as_str(),
        &task.planned.start.format("%d/%m/%Y").to_string(),
        &task.planned.end.format("%d/%m/%Y").to_string(),
        &task.actual.start.format("%d/%m/%Y").to_string(),
        &task.actual.end.format("%d/%m/%Y").to_string(),
        &format!("{}%", task.progress.percent()),
        task.risk.label(),
        task.kind.label(),
        task.visible_stage().unwrap_or(""),
        task.depends_on.as_deref().unwrap_or("none"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateInterval, Schedule, Task};
    use chrono::NaiveDate;

    #[test]
    fn export_flattens_subtasks_and_reimports_cleanly() {
        let dir = std::env::temp_dir().join("planboard-export-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("schedule.csv");

        let start = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        let mut schedule = Schedule::new("Export");
        let mut root = Task::new("1", "Phase 1", DateInterval::new(start, end));
        root.subtasks
            .push(Task::new("1.1", "Kickoff", DateInterval::on(start)));
        schedule.tasks.push(root);

        let written = export_csv(&schedule.tasks, &path).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().next().unwrap().contains("Planned Start"));
        assert!(content.contains("1.1;Kickoff"));
        assert!(content.contains("01/11/2024"));
        std::fs::remove_file(&path).ok();
    }
}
