/*
[INPUT]:  Five-field cron strings entered by the user or stored on tasks
[OUTPUT]: Validation result and human-readable schedule descriptions
[POS]:    Domain layer - schedule formatting for the wizard and task views
[UPDATE]: When adding presets or recognised cron shapes
*/

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Schedule is empty")]
    Empty,
    #[error("Expected 5 fields (minute hour day month weekday), found {found}")]
    FieldCount { found: usize },
    #[error("Invalid {field} field '{value}'")]
    InvalidField { field: &'static str, value: String },
    #[error("{field} value {value} is outside {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// A named cron expression offered as a quick choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePreset {
    pub label: &'static str,
    pub cron: &'static str,
}

pub const PRESETS: &[SchedulePreset] = &[
    SchedulePreset {
        label: "Every hour",
        cron: "0 * * * *",
    },
    SchedulePreset {
        label: "Every 6 hours",
        cron: "0 */6 * * *",
    },
    SchedulePreset {
        label: "Daily at 09:00",
        cron: "0 9 * * *",
    },
    SchedulePreset {
        label: "Weekly on Monday at 09:00",
        cron: "0 9 * * 1",
    },
];

pub const DEFAULT_SCHEDULE: &str = "0 9 * * *";

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
}

const FIELDS: [FieldSpec; 5] = [
    FieldSpec {
        name: "minute",
        min: 0,
        max: 59,
    },
    FieldSpec {
        name: "hour",
        min: 0,
        max: 23,
    },
    FieldSpec {
        name: "day-of-month",
        min: 1,
        max: 31,
    },
    FieldSpec {
        name: "month",
        min: 1,
        max: 12,
    },
    // 0 and 7 are both Sunday
    FieldSpec {
        name: "day-of-week",
        min: 0,
        max: 7,
    },
];

const WEEKDAYS: [&str; 8] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn validate(cron: &str) -> Result<(), ScheduleError> {
    let fields: Vec<&str> = cron.split_whitespace().collect();
    if fields.is_empty() {
        return Err(ScheduleError::Empty);
    }
    if fields.len() != FIELDS.len() {
        return Err(ScheduleError::FieldCount {
            found: fields.len(),
        });
    }
    for (raw, spec) in fields.iter().zip(FIELDS.iter()) {
        validate_field(raw, spec)?;
    }
    Ok(())
}

fn validate_field(raw: &str, spec: &FieldSpec) -> Result<(), ScheduleError> {
    let invalid = || ScheduleError::InvalidField {
        field: spec.name,
        value: raw.to_string(),
    };

    for part in raw.split(',') {
        if part == "*" {
            continue;
        }
        if let Some(step) = part.strip_prefix("*/") {
            let step: u32 = step.parse().map_err(|_| invalid())?;
            if step == 0 || step > spec.max {
                return Err(invalid());
            }
            continue;
        }
        if let Some((start, end)) = part.split_once('-') {
            let start = bounded(start, spec).ok_or_else(invalid)??;
            let end = bounded(end, spec).ok_or_else(invalid)??;
            if start > end {
                return Err(invalid());
            }
            continue;
        }
        bounded(part, spec).ok_or_else(invalid)??;
    }
    Ok(())
}

/// `None` when `raw` is not a number at all.
fn bounded(raw: &str, spec: &FieldSpec) -> Option<Result<u32, ScheduleError>> {
    let value: u32 = raw.parse().ok()?;
    if value < spec.min || value > spec.max {
        return Some(Err(ScheduleError::OutOfRange {
            field: spec.name,
            value,
            min: spec.min,
            max: spec.max,
        }));
    }
    Some(Ok(value))
}

/// Plain-English rendering of the common cron shapes.
pub fn describe(cron: &str) -> String {
    let cron = cron.trim();
    if validate(cron).is_err() {
        return custom(cron);
    }
    let fields: Vec<&str> = cron.split_whitespace().collect();
    let &[minute, hour, day, month, weekday] = fields.as_slice() else {
        return custom(cron);
    };

    if let Some(step) = minute.strip_prefix("*/") {
        if [hour, day, month, weekday].iter().all(|field| *field == "*") {
            return match step {
                "1" => "Every minute".to_string(),
                _ => format!("Every {step} minutes"),
            };
        }
        return custom(cron);
    }

    let Ok(minute) = minute.parse::<u32>() else {
        return custom(cron);
    };

    if month != "*" {
        return custom(cron);
    }

    if day == "*" && weekday == "*" {
        if hour == "*" {
            return match minute {
                0 => "Every hour".to_string(),
                _ => format!("Every hour at :{minute:02}"),
            };
        }
        if let Some(step) = hour.strip_prefix("*/") {
            return match step {
                "1" => "Every hour".to_string(),
                _ => format!("Every {step} hours"),
            };
        }
    }

    let Ok(hour) = hour.parse::<u32>() else {
        return custom(cron);
    };
    let at = format!("{hour:02}:{minute:02}");

    match (day, weekday) {
        ("*", "*") => format!("Daily at {at}"),
        ("*", "1-5") => format!("Weekdays at {at}"),
        ("*", weekday) => match weekday.parse::<usize>() {
            Ok(index) => format!("Weekly on {} at {at}", WEEKDAYS[index]),
            Err(_) => custom(cron),
        },
        (day, "*") => match day.parse::<u32>() {
            Ok(day) => format!("Monthly on day {day} at {at}"),
            Err(_) => custom(cron),
        },
        _ => custom(cron),
    }
}

fn custom(cron: &str) -> String {
    format!("Custom: {cron}")
}
