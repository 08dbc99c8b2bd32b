use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

/// When a universe's selection function should run. A csv-backed constituent list is
/// just a selection function under one of these same schedules — it only changes when
/// the file is re-read, driven by the same cadence as any other scheduled selection.
#[derive(Clone, Debug, PartialEq)]
pub enum UniverseSchedule {
    EveryBar,
    TimeOfDay { hour: u32, minute: u32 },
    Weekday { day: Weekday },
    Once { at: DateTime<Utc> },
}

impl UniverseSchedule {
    /// Whether selection should run given the current frontier time and the last time
    /// it ran (`None` if it has never run).
    pub fn should_run(&self, current_time: DateTime<Utc>, last_run: Option<DateTime<Utc>>) -> bool {
        match self {
            UniverseSchedule::EveryBar => true,
            UniverseSchedule::TimeOfDay { hour, minute } => {
                let matches = current_time.hour() == *hour && current_time.minute() == *minute;
                matches && last_run.map_or(true, |t| t.date_naive() != current_time.date_naive())
            }
            UniverseSchedule::Weekday { day } => {
                let matches = current_time.weekday() == *day;
                matches && last_run.map_or(true, |t| t.date_naive() != current_time.date_naive())
            }
            UniverseSchedule::Once { at } => last_run.is_none() && current_time >= *at,
        }
    }
}
