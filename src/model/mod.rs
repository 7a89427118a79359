pub mod axis;
pub mod bar;
pub mod schedule;
pub mod task;

pub use axis::{AxisBucket, Granularity, HeaderSpan, TimeAxis};
pub use bar::{map_interval, BarGeometry};
pub use schedule::{Row, Schedule};
pub use task::{DateInterval, DurationDays, Progress, RiskLevel, Task, TaskDraft, TaskKind};
