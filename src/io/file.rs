use std::path::Path;

use thiserror::Error;

use crate::model::Schedule;

/// Failures while reading or writing schedule files.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid schedule file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Save a schedule to a JSON file.
pub fn save_schedule(schedule: &Schedule, path: &Path) -> Result<(), FileError> {
    let json = serde_json::to_string_pretty(schedule)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a schedule from a JSON file.
pub fn load_schedule(path: &Path) -> Result<Schedule, FileError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateInterval, Task};
    use chrono::NaiveDate;

    #[test]
    fn schedule_round_trips_through_json() {
        let mut schedule = Schedule::new("Roundtrip");
        let start = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 11, 10).unwrap();
        let mut task = Task::new("1", "Phase 1", DateInterval::new(start, end));
        task.subtasks
            .push(Task::new("1.1", "Kickoff", DateInterval::on(start)));
        schedule.tasks.push(task);

        let json = serde_json::to_string(&schedule).unwrap();
        let loaded: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, schedule);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let err = serde_json::from_str::<Schedule>("{\"name\": 3}");
        assert!(err.is_err());
    }
}
