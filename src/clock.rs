use chrono::{Local, NaiveDateTime};

/// Source of the "Exported" timestamp printed under the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportClock {
    #[default]
    System,
    Fixed(NaiveDateTime),
}

impl ExportClock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            ExportClock::System => Local::now().naive_local(),
            ExportClock::Fixed(at) => *at,
        }
    }

    /// `M/D/YYYY, h:mm:ss AM`, the en-US short date-time form.
    pub fn stamp(&self) -> String {
        format_exported_at(self.now())
    }
}

pub fn format_exported_at(at: NaiveDateTime) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
